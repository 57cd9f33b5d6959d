fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    // Host builds (tests, fuzzing) never link against ESP-IDF.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
