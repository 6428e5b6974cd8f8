//! Offline replay of canned spot events through the aggregation core.
//! Useful for eyeballing rollover behavior without gateway credentials.

use trendbar_forge::{BarDispatcher, Envelope, Period};

// Two M1 buckets of BTCUSD trendbar progress, then an ETHUSD tick that
// crosses the boundary and closes the first bar for everyone.
const FRAMES: &[&str] = &[
    r#"{"payloadType":2131,"payload":{"symbolId":"10026","timestamp":"6000000","bid":"100050","trendbar":[{"low":"100000","deltaOpen":"0","deltaHigh":"100"}]}}"#,
    r#"{"payloadType":2131,"payload":{"symbolId":"10026","timestamp":"6015000","bid":"100100","trendbar":[{"low":"100000","deltaOpen":"0","deltaHigh":"1000"}]}}"#,
    r#"{"payloadType":2131,"payload":{"symbolId":"10029","timestamp":"6030000","bid":"200400","trendbar":[{"low":"200000","deltaOpen":"100","deltaHigh":"500"}]}}"#,
    r#"{"payloadType":2131,"payload":{"symbolId":"10029","timestamp":"6060000","bid":"200500","trendbar":[{"low":"200000","deltaOpen":"100","deltaHigh":"600"}]}}"#,
];

fn main() {
    tracing_subscriber::fmt::init();

    let mut dispatcher = BarDispatcher::new(Period::M1);
    dispatcher.add_instrument(10026, "BTCUSD");
    dispatcher.add_instrument(10029, "ETHUSD");

    for frame in FRAMES {
        let envelope = Envelope::parse(frame).expect("canned frame");
        if !envelope.is_spot_event() {
            continue;
        }
        for bar in dispatcher.process_payload(&envelope.payload) {
            println!("{}", bar);
        }
    }
}
