//! External forces applied during Pass 2 (acceleration): gravity and
//! the user-driven cursor force field.

pub mod external;
pub mod gravity;
