// # IP Source Trait
//
// Defines the interface for discovering the host's current public IP.
//
// ## Implementations
//
// - HTTP "what is my IP" service: `gdddcd-ip-http` crate
//
// ## Usage
//
// ```rust,ignore
// use gdddcd_core::IpSource;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let source = /* IpSource implementation */;
//
//     let current_ip = source.current().await?;
//     println!("public IP: {}", current_ip);
//
//     Ok(())
// }
// ```

use async_trait::async_trait;

/// Trait for IP source implementations
///
/// A source answers one question per call: what does the outside world
/// currently see as our address? It keeps no state between calls.
///
/// The returned value is a dotted-quad *shaped* string. Implementations only
/// check digit-group shape, so values like `999.999.999.999` are passed
/// through to the provider unchanged.
///
/// ## Forbidden Capabilities
/// - Performing DNS updates (use `DnsProvider`)
/// - Touching the state store (owned by `DdnsEngine`)
/// - Retrying or sleeping (the next tick is the retry)
#[async_trait]
pub trait IpSource: Send + Sync {
    /// Fetch the current public IP
    ///
    /// # Returns
    ///
    /// - `Ok(String)`: The discovered address
    /// - `Err(Error)`: A discovery error; the engine abandons the tick
    async fn current(&self) -> Result<String, crate::Error>;
}
