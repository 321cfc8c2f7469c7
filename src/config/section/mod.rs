//! Configuration section definitions.
//!
//! Each module corresponds to a section in `scenebridge.toml`:
//!
//! | Module    | TOML Section | Purpose                                   |
//! |-----------|--------------|-------------------------------------------|
//! | `modules` | `[modules]`  | Module manifest, fetch base and staging   |
//! | `runtime` | `[runtime]`  | Entry-point names and call timeout        |
//! | `live`    | `[live]`     | Push-notification channel                 |
//! | `serve`   | `[serve]`    | Development server                        |

mod live;
mod modules;
mod runtime;
mod serve;

pub use live::LiveConfig;
pub use modules::ModulesConfig;
pub use runtime::RuntimeConfig;
pub use serve::ServeConfig;
