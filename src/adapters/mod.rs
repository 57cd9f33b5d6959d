//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements   | Connects to               |
//! |------------|--------------|---------------------------|
//! | `hardware` | RangingPort  | HC-SR04 trigger/echo      |
//! |            | OutputPort   | buzzer + relay GPIO       |
//! | `log_sink` | EventSink    | Serial log output         |
//! | `nvs`      | StoragePort  | NVS / in-memory store     |
//! | `time`     | Clock        | ESP32 system timer        |

pub mod hardware;
pub mod log_sink;
pub mod nvs;
pub mod time;
