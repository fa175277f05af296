// SmartCane V1 — Publish Channel
//
// Wi-Fi station + MQTT client.  Messages are enqueued and forgotten; the
// connection events are drained on a separate thread.  Without build-time
// Wi-Fi credentials the channel falls back to the serial log.

use std::thread;

use anyhow::anyhow;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::hal::modem::Modem;
use esp_idf_svc::mqtt::client::{EspMqttClient, EspMqttConnection, MqttClientConfiguration, QoS};
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use esp_idf_svc::wifi::{AuthMethod, BlockingWifi, ClientConfiguration, Configuration, EspWifi};

use crate::config::*;
use crate::events::Visibility;
use crate::io::Publisher;

/// Join the configured access point; blocks until the interface has an address.
pub fn connect_wifi(
    modem: Modem,
    sysloop: EspSystemEventLoop,
    nvs: EspDefaultNvsPartition,
) -> anyhow::Result<BlockingWifi<EspWifi<'static>>> {
    let mut wifi = BlockingWifi::wrap(EspWifi::new(modem, sysloop.clone(), Some(nvs))?, sysloop)?;

    wifi.set_configuration(&Configuration::Client(ClientConfiguration {
        ssid: WIFI_SSID.try_into().map_err(|_| anyhow!("SSID `{}` is too long", WIFI_SSID))?,
        password: WIFI_PASS.try_into().map_err(|_| anyhow!("Wi-Fi password is too long"))?,
        auth_method: if WIFI_PASS.is_empty() {
            AuthMethod::None
        } else {
            AuthMethod::WPA2Personal
        },
        ..Default::default()
    }))?;

    wifi.start()?;
    wifi.connect()?;
    wifi.wait_netif_up()?;

    let ip = wifi.wifi().sta_netif().get_ip_info()?;
    log::info!("Wi-Fi connected to `{}`, ip {}", WIFI_SSID, ip.ip);
    Ok(wifi)
}

pub struct MqttPublisher {
    client: EspMqttClient<'static>,
}

impl MqttPublisher {
    pub fn connect(url: &str) -> anyhow::Result<Self> {
        let conf = MqttClientConfiguration {
            client_id: Some(MQTT_CLIENT_ID),
            ..Default::default()
        };
        let (client, connection) = EspMqttClient::new(url, &conf)?;

        thread::Builder::new()
            .name("mqtt".into())
            .stack_size(STACK_MQTT)
            .spawn(move || drain_events(connection))?;

        log::info!("MQTT client started ({})", url);
        Ok(Self { client })
    }
}

fn drain_events(mut connection: EspMqttConnection) {
    while let Ok(event) = connection.next() {
        log::debug!("MQTT event: {:?}", event.payload());
    }
    log::warn!("MQTT connection closed");
}

/// Topic on the wire: `smartcane/<private|public>/<topic>`.
fn wire_topic(topic: &str, visibility: Visibility) -> String {
    format!("{}/{}/{}", MQTT_TOPIC_PREFIX, visibility.as_str(), topic)
}

/// Publish channel picked at boot.
pub enum Uplink {
    Mqtt(MqttPublisher),
    Serial,
}

impl Publisher for Uplink {
    fn publish(&mut self, topic: &str, payload: &str, visibility: Visibility) -> anyhow::Result<()> {
        let topic = wire_topic(topic, visibility);
        match self {
            Self::Mqtt(mqtt) => {
                mqtt.client.enqueue(&topic, QoS::AtMostOnce, false, payload.as_bytes())?;
            }
            Self::Serial => log::info!("{} = {}", topic, payload),
        }
        Ok(())
    }
}
