pub mod export_public;
pub mod init;
pub mod inspect;
pub mod keygen;
mod passphrase;
pub mod protect;
pub mod version;

pub use export_public::ExportPublic;
pub use init::Init;
pub use inspect::Inspect;
pub use keygen::Keygen;
pub use protect::Protect;
pub use version::Version;
