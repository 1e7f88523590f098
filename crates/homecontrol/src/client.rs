//! The Home-Control Client: sends an extracted `DeviceCall` to the control
//! plane, timeout-wrapped to prevent indefinite blocking (grounded on the
//! `ToolRegistry::execute` timeout pattern — a slow device bridge must not
//! stall the whole pipeline).

use std::time::Duration;

use serde::Serialize;
use tokio::time::timeout;

use crate::error::HomeControlError;
use crate::extractor::DeviceCall;

const DEFAULT_TIMEOUT_SECS: u64 = 5;

#[derive(Serialize)]
struct ControlPlaneRequest<'a> {
    area: &'a str,
    device_kind: &'a str,
    action: &'a str,
    parameters: &'a std::collections::HashMap<String, String>,
}

#[derive(serde::Deserialize)]
struct ControlPlaneResponse {
    acknowledgement: String,
}

pub struct HomeControlClient {
    client: reqwest::Client,
    base_url: String,
}

impl HomeControlClient {
    pub fn new(base_url: String) -> Self {
        Self { client: reqwest::Client::new(), base_url }
    }

    pub async fn send(&self, call: &DeviceCall) -> Result<String, HomeControlError> {
        let request = self.client.post(format!("{}/v1/devices/command", self.base_url)).json(&ControlPlaneRequest {
            area: &call.area,
            device_kind: &call.device_kind,
            action: &call.action,
            parameters: &call.parameters,
        });

        let response = timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS), request.send())
            .await
            .map_err(|_| HomeControlError::Unavailable("control plane timed out".to_string()))?
            .map_err(|err| HomeControlError::Unavailable(err.to_string()))?;

        if response.status().is_server_error() {
            return Err(HomeControlError::Unavailable(format!("status {}", response.status())));
        }
        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(HomeControlError::Rejected(body));
        }

        let parsed: ControlPlaneResponse = response
            .json()
            .await
            .map_err(|err| HomeControlError::Unavailable(format!("malformed control plane response: {err}")))?;
        Ok(parsed.acknowledgement)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serializes_with_expected_shape() {
        let mut parameters = std::collections::HashMap::new();
        parameters.insert("value".to_string(), "68".to_string());
        let call = DeviceCall {
            area: "office".to_string(),
            device_kind: "thermostat".to_string(),
            action: "set_temperature".to_string(),
            parameters,
        };
        let request = ControlPlaneRequest {
            area: &call.area,
            device_kind: &call.device_kind,
            action: &call.action,
            parameters: &call.parameters,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["area"], "office");
        assert_eq!(json["action"], "set_temperature");
    }
}
