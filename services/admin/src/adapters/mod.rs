pub mod chat;
pub mod classes;
pub mod http;
pub mod students;

pub use chat::RestChatAdapter;
pub use classes::RestClassAdapter;
pub use http::HttpClient;
pub use students::RestStudentAdapter;
