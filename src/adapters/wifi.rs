//! WiFi station adapter.
//!
//! Joins the network whose credentials were baked in at build time.  The
//! outlet requests, SNTP and the status server all need it, so startup
//! blocks until it is up or the attempts run out.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: `EspWifi` wrapped in `BlockingWifi`.
//! - **all other targets**: simulation that succeeds immediately.

use core::fmt::Display;
use core::time::Duration;

use log::{info, warn};

use crate::config::WifiCredentials;
use crate::error::CommsError;

pub const CONNECT_ATTEMPTS: u32 = 5;
pub const RETRY_DELAY: Duration = Duration::from_secs(2);

/// Run `attempt` up to `attempts` times, calling `between` after each
/// failure except the last.
pub fn retry_connect<E: Display>(
    attempts: u32,
    mut attempt: impl FnMut(u32) -> Result<(), E>,
    mut between: impl FnMut(),
) -> Result<u32, CommsError> {
    for n in 1..=attempts {
        info!("WiFi: connect attempt {}/{}", n, attempts);
        match attempt(n) {
            Ok(()) => return Ok(n),
            Err(e) => warn!("WiFi: attempt {} failed: {}", n, e),
        }
        if n < attempts {
            between();
        }
    }
    Err(CommsError::WifiConnectFailed)
}

#[cfg(target_os = "espidf")]
pub fn connect_station(
    modem: esp_idf_svc::hal::modem::Modem,
    sys_loop: esp_idf_svc::eventloop::EspSystemEventLoop,
    nvs: Option<esp_idf_svc::nvs::EspDefaultNvsPartition>,
    creds: &WifiCredentials,
) -> anyhow::Result<esp_idf_svc::wifi::EspWifi<'static>> {
    use anyhow::anyhow;
    use embedded_svc::wifi::{AuthMethod, ClientConfiguration, Configuration};
    use esp_idf_svc::wifi::{BlockingWifi, EspWifi};

    let mut esp_wifi = EspWifi::new(modem, sys_loop.clone(), nvs)?;
    {
        let mut wifi = BlockingWifi::wrap(&mut esp_wifi, sys_loop)?;

        let auth_method = if creds.is_open() {
            AuthMethod::None
        } else {
            AuthMethod::WPAWPA2Personal
        };
        wifi.set_configuration(&Configuration::Client(ClientConfiguration {
            ssid: creds
                .ssid
                .as_str()
                .try_into()
                .map_err(|_| anyhow!("wifi ssid too long"))?,
            password: creds
                .password
                .as_str()
                .try_into()
                .map_err(|_| anyhow!("wifi password too long"))?,
            auth_method,
            ..Default::default()
        }))?;
        wifi.start()?;
        info!("WiFi: started, joining '{}'", creds.ssid);

        retry_connect(
            CONNECT_ATTEMPTS,
            |_| {
                let r = wifi.connect().and_then(|()| wifi.wait_netif_up());
                if r.is_err() {
                    let _ = wifi.disconnect();
                }
                r
            },
            || std::thread::sleep(RETRY_DELAY),
        )?;
    }

    info!("WiFi: connected to '{}'", creds.ssid);
    Ok(esp_wifi)
}

/// Simulation: always connected.
#[cfg(not(target_os = "espidf"))]
pub fn connect_station(creds: &WifiCredentials) -> Result<(), CommsError> {
    info!("WiFi(sim): connected to '{}'", creds.ssid);
    Ok(())
}
