pub mod api;
pub mod classify;
pub mod error;
pub mod filter;
pub mod state;
pub mod surface;
pub mod view;

pub use api::ValidationApi;
pub use classify::EventKind;
pub use error::ApiError;
pub use filter::{FilterCriteria, FilterOptions};
pub use state::{ChannelStatus, ExportScope, LiveView, RESULT_BUFFER_CAP, TABLE_ROW_CAP};
pub use surface::Surface;
