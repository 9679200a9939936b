//! Raw key to player-intent mapping
//!
//! The simulation core never sees scan codes; it consumes the [`PlayerKey`]
//! stream only. Press and release both map, so held keys become held intent
//! bits rather than repeated impulses.

/// The narrow set of keys the game cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCode {
    W,
    A,
    S,
    D,
    Up,
    Down,
    Left,
    Right,
    Space,
    Other,
}

/// One transition in the player-intent stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerKey {
    None,
    ForwardPressed,
    ForwardReleased,
    BackwardPressed,
    BackwardReleased,
    LeftPressed,
    LeftReleased,
    RightPressed,
    RightReleased,
    ShootPressed,
    ShootReleased,
    /// Sentinel pushed when the window closes; unblocks and terminates the
    /// tick thread.
    EndOfInput,
}

/// Map a key event to a player-intent transition.
pub fn map_player_key(key: KeyCode, pressed: bool) -> PlayerKey {
    match (key, pressed) {
        (KeyCode::W | KeyCode::Up, true) => PlayerKey::ForwardPressed,
        (KeyCode::W | KeyCode::Up, false) => PlayerKey::ForwardReleased,
        (KeyCode::S | KeyCode::Down, true) => PlayerKey::BackwardPressed,
        (KeyCode::S | KeyCode::Down, false) => PlayerKey::BackwardReleased,
        (KeyCode::A | KeyCode::Left, true) => PlayerKey::LeftPressed,
        (KeyCode::A | KeyCode::Left, false) => PlayerKey::LeftReleased,
        (KeyCode::D | KeyCode::Right, true) => PlayerKey::RightPressed,
        (KeyCode::D | KeyCode::Right, false) => PlayerKey::RightReleased,
        (KeyCode::Space, true) => PlayerKey::ShootPressed,
        (KeyCode::Space, false) => PlayerKey::ShootReleased,
        (KeyCode::Other, _) => PlayerKey::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wasd_and_arrows_agree() {
        assert_eq!(
            map_player_key(KeyCode::W, true),
            map_player_key(KeyCode::Up, true)
        );
        assert_eq!(
            map_player_key(KeyCode::A, false),
            map_player_key(KeyCode::Left, false)
        );
    }

    #[test]
    fn test_press_release_pairs() {
        assert_eq!(map_player_key(KeyCode::Space, true), PlayerKey::ShootPressed);
        assert_eq!(
            map_player_key(KeyCode::Space, false),
            PlayerKey::ShootReleased
        );
        assert_eq!(map_player_key(KeyCode::Other, true), PlayerKey::None);
    }
}
