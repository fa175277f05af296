fn main() {
    // Host builds (tests, simulation) have no ESP-IDF environment to export.
    if std::env::var("CARGO_CFG_TARGET_OS").as_deref() == Ok("espidf") {
        embuild::espidf::sysenv::output();
    }

    for var in ["CANE_WIFI_SSID", "CANE_WIFI_PASS", "CANE_MQTT_URL"] {
        println!("cargo:rerun-if-env-changed={var}");
    }
}
