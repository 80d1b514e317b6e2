pub mod captcha_client;
pub mod sink;

pub use captcha_client::{CaptchaDecoder, HttpCaptchaDecoder, SliderSolution};
pub use sink::{HttpSink, JsonLinesSink, OrderSink};
