pub mod appointment;
pub mod availability;
pub mod booking;
pub mod conversation;
pub mod specialty;

pub use appointment::{AppointmentDetails, AppointmentRecord, AppointmentRequest, AppointmentStatus, Field};
pub use availability::{AvailabilityCheck, AvailabilitySlot, ClinicHours, OpeningSlot};
pub use booking::{BookingReceipt, BookingSubmission, CustomAnswer, EventType, Invitee, OpenSlot};
pub use conversation::{ConversationMessage, ConversationState, Phase};
pub use specialty::{EventTypeMap, Specialty};
