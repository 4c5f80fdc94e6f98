//! Domain model (manifest, wire events, phases, devices, errors).

pub mod device;
pub mod errors;
pub mod event;
pub mod ids;
pub mod manifest;
pub mod state;

pub use self::device::{DeviceSpec, Devices, Robot};
pub use self::errors::{BoxError, ChannelError, CreateError, DelegationError, RunError};
pub use self::event::EventEnvelope;
pub use self::ids::InstanceId;
pub use self::manifest::{MANIFEST_PATH, Manifest, ManifestIssue};
pub use self::state::{TaskKind, TaskPhase};
