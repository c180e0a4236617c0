pub mod dates;
pub mod grouping;
pub mod listing;
pub mod remote;
pub mod slots;

pub use dates::{is_valid_date, DateFormatter, DateLocale};
pub use grouping::{distinct_appointment_dates, group_by_date_time};
pub use listing::{build_list_view, AppointmentListService};
pub use remote::AppointmentApiService;
pub use slots::SlotPolicy;
