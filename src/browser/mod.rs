pub mod cdp;
pub mod cdp_page;
pub mod page;
pub mod session;

pub use cdp::launch_browser;
pub use cdp_page::CdpPage;
pub use page::{DriverError, ElementHandle, PageDriver, QueryRoot};
pub use session::{BrowserSession, CdpSessionProvisioner, SessionProvisioner};
