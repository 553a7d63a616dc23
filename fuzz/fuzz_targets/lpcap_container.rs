#![no_main]
use libfuzzer_sys::fuzz_target;
use lpcap_file::lpcap::Container;

fuzz_target!(|data: &[u8]| {
    if let Ok(container) = Container::from_store(data.to_vec()) {
        for _ in container.packets() {

        }
        let _ = container.close();
    }
});
