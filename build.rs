fn main() {
    // Export the ESP-IDF sysenv captured by esp-idf-sys so the linker can
    // find the framework.  No-op for host-target builds (the espidf feature
    // is off and esp-idf-sys never ran).
    if std::env::var("CARGO_FEATURE_ESPIDF").is_ok() {
        embuild::espidf::sysenv::output();
    }
}
