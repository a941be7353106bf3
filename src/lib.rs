//! Blocking client for the APIVerve Slot Machine Simulator API.
//!
//! ```no_run
//! use slotmachine_client::{ClientConfig, QueryOptions, SlotMachineClient};
//!
//! let client = SlotMachineClient::new(ClientConfig::new("your-api-key")?)?;
//! let response = client.execute(&QueryOptions::new().spins(5).reels(3).bet(1.0))?;
//! if response.is_ok() {
//!     let sim = response.simulation()?;
//!     println!("net profit: {}", sim.net_profit);
//! }
//! # Ok::<(), slotmachine_client::ClientError>(())
//! ```

pub mod api_client;
pub mod app_paths;
pub mod config;
pub mod display;
pub mod error;
pub mod logging;
pub mod query;
pub mod response;
pub mod transport;

pub use api_client::SlotMachineClient;
pub use config::client::{ClientConfig, ClientConfigBuilder};
pub use error::{ClientError, ClientResult};
pub use query::{QueryOptions, QueryValue};
pub use response::{ApiResponse, SimulationData};
pub use transport::{HttpRequest, HttpResponse, HttpTransport, Transport, TransportError};
