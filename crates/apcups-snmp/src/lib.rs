// apcups-snmp: Async SNMP client for APC UPS network management cards

pub mod client;
pub mod error;
pub mod oid;
pub mod pool;
pub mod session;
pub mod target;
pub mod value;

pub use client::{UpsIdentity, UpsSnmpClient};
pub use error::Error;
pub use oid::OidKey;
pub use pool::SnmpWorkerPool;
pub use session::{PduOutcome, Snmp2Session, SnmpSession};
pub use target::{
    AuthAlgorithm, AuthCredential, ConnectionTarget, Credentials, CredentialsError,
    PrivacyAlgorithm, PrivacyCredential, SecurityLevel, SnmpVersion, UserSecurity,
};
pub use value::{RawScalar, UpsValue};
