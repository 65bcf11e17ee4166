pub mod chat;
pub mod controller;
pub mod decode;
pub mod domain;
pub mod normalize;
pub mod pager;
pub mod ports;
pub mod toast;
pub mod validation;

pub use chat::{ChatMessage, ChatSession, Sender};
pub use controller::{DeleteOutcome, FormDialog, Phase, StudentsController, SubmitOutcome, ViewState};
pub use domain::{Class, RecordId, Student, StudentCreateUpdateRequest};
pub use ports::{ChatService, ClassService, ErrorKind, PortError, PortResult, StudentService};
pub use toast::{Toast, ToastKind};
pub use validation::{Field, StudentForm, ValidationErrors};
