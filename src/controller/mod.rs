pub mod bindings;
pub mod controller;

pub use bindings::{binding_for, initial_binding};
pub use controller::ModelAnimationController;
