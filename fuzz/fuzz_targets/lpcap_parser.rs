#![no_main]
use libfuzzer_sys::fuzz_target;
use lpcap_file::lpcap::LpcapParser;

fuzz_target!(|data: &[u8]| {
    if let Ok((mut src, parser)) = LpcapParser::new(data) {
        while let Ok((rem, _)) = parser.next_packet(src) {
            if rem.is_empty() {
                break;
            }
            src = rem;
        }
    }
});
