fn main() {
    println!("cargo:rerun-if-changed=www");
    println!("cargo:rerun-if-env-changed=VMC_WIFI_SSID");
    println!("cargo:rerun-if-env-changed=VMC_WIFI_PASSWORD");
    println!("cargo:rerun-if-env-changed=VMC_PROFILE");

    // Only flash builds need the ESP-IDF environment; host tests skip it.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
