#![no_main]

use libfuzzer_sys::fuzz_target;
use restkit_uri::{UriTemplate, from_fn};

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        // Parse errors are fine, panics are not
        if let Ok(template) = UriTemplate::parse(s) {
            let _ = template.expand(&from_fn(|name| Some(name.repeat(2))));
            let _ = template.expand(&from_fn(|_| None));
        }
    }
});
