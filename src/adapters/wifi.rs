//! WiFi station-mode adapter.
//!
//! Implements [`ConnectivityPort`] — the boundary for network bring-up,
//! reconnection, and the radio side of the power policy.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: real ESP-IDF WiFi driver calls via
//!   `esp_idf_svc::wifi::BlockingWifi`, attached from `main()` where
//!   peripheral ownership is established.
//! - **all other targets**: simulation stubs for host-side tests.
//!
//! ## Reconnection policy
//!
//! Connection attempts are bounded (no infinite blocking): each
//! `connect()` makes up to [`MAX_CONNECT_ATTEMPTS`] tries with a doubling
//! backoff capped at [`MAX_BACKOFF_SECS`].  A failure leaves the adapter
//! disconnected; the driver loop retries on a later cycle.

use core::fmt;
use log::{info, warn};

use crate::power::PowerMode;

// ───────────────────────────────────────────────────────────────
// Port trait
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectivityError {
    NoCredentials,
    InvalidSsid,
    InvalidPassword,
    ConnectionFailed,
}

impl fmt::Display for ConnectivityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoCredentials => write!(f, "no WiFi credentials configured"),
            Self::InvalidSsid => write!(f, "SSID invalid (must be 1-32 printable ASCII bytes)"),
            Self::InvalidPassword => {
                write!(f, "password invalid (must be 8-64 bytes for WPA2, or empty for open)")
            }
            Self::ConnectionFailed => write!(f, "WiFi connection failed"),
        }
    }
}

pub trait ConnectivityPort {
    /// Bring the station up with the stored credentials.  Bounded.
    fn connect(&mut self) -> Result<(), ConnectivityError>;
    fn is_connected(&self) -> bool;
    fn set_credentials(&mut self, ssid: &str, password: &str) -> Result<(), ConnectivityError>;
    /// Apply the power policy's radio decision.
    fn apply_power_mode(&mut self, mode: PowerMode);
}

const MAX_CONNECT_ATTEMPTS: u32 = 3;
const MAX_BACKOFF_SECS: u32 = 8;

// ───────────────────────────────────────────────────────────────
// Credential validation
// ───────────────────────────────────────────────────────────────

fn is_printable_ascii(s: &str) -> bool {
    s.bytes().all(|b| (0x20..=0x7E).contains(&b))
}

fn validate_ssid(ssid: &str) -> Result<(), ConnectivityError> {
    if ssid.is_empty() || ssid.len() > 32 || !is_printable_ascii(ssid) {
        return Err(ConnectivityError::InvalidSsid);
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), ConnectivityError> {
    if password.is_empty() {
        return Ok(()); // open network
    }
    if password.len() < 8 || password.len() > 64 {
        return Err(ConnectivityError::InvalidPassword);
    }
    Ok(())
}

// ───────────────────────────────────────────────────────────────
// Adapter
// ───────────────────────────────────────────────────────────────

pub struct WifiAdapter {
    ssid: heapless::String<32>,
    password: heapless::String<64>,
    #[cfg(target_os = "espidf")]
    driver: Option<esp_idf_svc::wifi::BlockingWifi<esp_idf_svc::wifi::EspWifi<'static>>>,
    #[cfg(not(target_os = "espidf"))]
    sim_connected: bool,
}

impl WifiAdapter {
    pub fn new() -> Self {
        Self {
            ssid: heapless::String::new(),
            password: heapless::String::new(),
            #[cfg(target_os = "espidf")]
            driver: None,
            #[cfg(not(target_os = "espidf"))]
            sim_connected: false,
        }
    }

    /// Attach the driver built in `main()` (modem peripheral, sysloop,
    /// NVS partition).
    #[cfg(target_os = "espidf")]
    pub fn attach(
        &mut self,
        driver: esp_idf_svc::wifi::BlockingWifi<esp_idf_svc::wifi::EspWifi<'static>>,
    ) {
        self.driver = Some(driver);
    }

    // ── Platform-specific ─────────────────────────────────────

    #[cfg(target_os = "espidf")]
    fn platform_connect(&mut self) -> Result<(), ConnectivityError> {
        use esp_idf_svc::wifi::{AuthMethod, ClientConfiguration, Configuration};

        let driver = self
            .driver
            .as_mut()
            .ok_or(ConnectivityError::ConnectionFailed)?;

        let auth_method = if self.password.is_empty() {
            AuthMethod::None
        } else {
            AuthMethod::WPA2Personal
        };
        let config = Configuration::Client(ClientConfiguration {
            ssid: self.ssid.clone(),
            password: self.password.clone(),
            auth_method,
            ..Default::default()
        });
        driver
            .set_configuration(&config)
            .map_err(|_| ConnectivityError::ConnectionFailed)?;

        driver.start().map_err(|_| ConnectivityError::ConnectionFailed)?;
        driver.connect().map_err(|_| ConnectivityError::ConnectionFailed)?;
        driver
            .wait_netif_up()
            .map_err(|_| ConnectivityError::ConnectionFailed)?;
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_connect(&mut self) -> Result<(), ConnectivityError> {
        self.sim_connected = true;
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn backoff(secs: u32) {
        std::thread::sleep(std::time::Duration::from_secs(u64::from(secs)));
    }

    #[cfg(not(target_os = "espidf"))]
    fn backoff(_secs: u32) {}

    /// Drop the link in simulation (host/test builds only).
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_set_connected(&mut self, connected: bool) {
        self.sim_connected = connected;
    }
}

impl ConnectivityPort for WifiAdapter {
    fn connect(&mut self) -> Result<(), ConnectivityError> {
        if self.ssid.is_empty() {
            return Err(ConnectivityError::NoCredentials);
        }

        let mut backoff_secs = 2;
        for attempt in 1..=MAX_CONNECT_ATTEMPTS {
            info!(
                "WiFi: connecting to '{}' (attempt {attempt}/{MAX_CONNECT_ATTEMPTS})",
                self.ssid
            );
            match self.platform_connect() {
                Ok(()) => {
                    info!("WiFi: connected");
                    return Ok(());
                }
                Err(e) => {
                    warn!("WiFi: attempt {attempt} failed ({e})");
                    if attempt < MAX_CONNECT_ATTEMPTS {
                        Self::backoff(backoff_secs);
                        backoff_secs = (backoff_secs * 2).min(MAX_BACKOFF_SECS);
                    }
                }
            }
        }
        Err(ConnectivityError::ConnectionFailed)
    }

    #[cfg(target_os = "espidf")]
    fn is_connected(&self) -> bool {
        self.driver
            .as_ref()
            .is_some_and(|d| d.is_connected().unwrap_or(false))
    }

    #[cfg(not(target_os = "espidf"))]
    fn is_connected(&self) -> bool {
        self.sim_connected
    }

    fn set_credentials(&mut self, ssid: &str, password: &str) -> Result<(), ConnectivityError> {
        validate_ssid(ssid)?;
        validate_password(password)?;
        self.ssid = heapless::String::try_from(ssid).map_err(|_| ConnectivityError::InvalidSsid)?;
        self.password =
            heapless::String::try_from(password).map_err(|_| ConnectivityError::InvalidPassword)?;
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn apply_power_mode(&mut self, mode: PowerMode) {
        use esp_idf_svc::sys::{
            esp_wifi_set_ps, esp_wifi_start, esp_wifi_stop, wifi_ps_type_t_WIFI_PS_MAX_MODEM,
            wifi_ps_type_t_WIFI_PS_NONE,
        };
        // SAFETY: single main-loop context; the driver was started in
        // connect() before any mode changes arrive.
        unsafe {
            match mode {
                PowerMode::Normal => {
                    esp_wifi_start();
                    esp_wifi_set_ps(wifi_ps_type_t_WIFI_PS_NONE);
                }
                PowerMode::LowPower => {
                    esp_wifi_set_ps(wifi_ps_type_t_WIFI_PS_MAX_MODEM);
                }
                PowerMode::Idle => {
                    esp_wifi_stop();
                }
            }
        }
        info!("WiFi: power mode {:?} applied", mode);
    }

    #[cfg(not(target_os = "espidf"))]
    fn apply_power_mode(&mut self, mode: PowerMode) {
        if mode == PowerMode::Idle {
            self.sim_connected = false;
        }
        info!("WiFi(sim): power mode {:?}", mode);
    }
}
