#![no_main]

use libfuzzer_sys::fuzz_target;
use restkit::{ContractCatalog, EndpointRegistry};
use serde_json::Value;

fuzz_target!(|data: &[u8]| {
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(catalog) = ContractCatalog::from_yaml_str(s) else {
        return;
    };

    // Build everything, then expand with all-null arguments
    let names: Vec<String> = catalog.contracts().map(|c| c.name.clone()).collect();
    let registry = EndpointRegistry::builder(catalog).build();
    for name in &names {
        if let Ok(descriptors) = registry.descriptors(name) {
            for descriptor in descriptors {
                let args = vec![Value::Null; descriptor.parameters().len()];
                let _ = descriptor.expand(&args);
            }
        }
    }
});
