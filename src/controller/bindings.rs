/// One number key and the asset it swaps in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyBinding {
    pub key: char,
    /// Slot made active once the swap is requested.
    pub slot: usize,
    pub asset_path: &'static str,
}

pub const KEY_BINDINGS: &[KeyBinding] = &[
    KeyBinding {
        key: '1',
        slot: 0,
        asset_path: "../fbx/Short Left Side Step.fbx",
    },
    KeyBinding {
        key: '2',
        slot: 1,
        asset_path: "../fbx/Taunt.fbx",
    },
    KeyBinding {
        key: '3',
        slot: 2,
        asset_path: "../fbx/Punching Bag.fbx",
    },
    KeyBinding {
        key: '4',
        slot: 3,
        asset_path: "../fbx/Martelo 2.fbx",
    },
    KeyBinding {
        key: '5',
        slot: 4,
        asset_path: "../fbx/Receive Uppercut To The Face.fbx",
    },
    KeyBinding {
        key: '6',
        slot: 5,
        asset_path: "../fbx/Boxing.fbx",
    },
];

/// Seconds over which the outgoing slot is faded on a key press.
pub const FADE_OUT_SECONDS: f32 = 0.5;

pub fn binding_for(key: char) -> Option<&'static KeyBinding> {
    let key = key.to_ascii_lowercase();
    KEY_BINDINGS.iter().find(|b| b.key == key)
}

/// The asset shown at start-up.
pub fn initial_binding() -> &'static KeyBinding {
    &KEY_BINDINGS[0]
}
