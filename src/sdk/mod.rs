//! Client for the public template API.
//!
//! ```no_run
//! # async fn demo() -> Result<(), everletter_service::sdk::SdkError> {
//! use everletter_service::sdk::EverLetterClient;
//! use everletter_service::template::TemplateVariable;
//!
//! let client = EverLetterClient::new("https://everletter.example.com")?;
//! let rendered = client
//!     .render_template("welcome", &[TemplateVariable::new("name", "Sam")])
//!     .await?;
//! println!("{}", rendered.html);
//! # Ok(())
//! # }
//! ```

mod client;

pub use client::{EverLetterClient, SdkError};
