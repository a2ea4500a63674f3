// Text decoding for key files

use std::path::Path;

use crate::error::IoError;

/// Read a file as text. A BOM selects UTF-8/UTF-16; otherwise UTF-8 is tried
/// first and Windows-1252 is the fallback.
pub fn read_text(path: &Path) -> Result<String, IoError> {
    let bytes = std::fs::read(path).map_err(|e| IoError::io(path, e))?;
    Ok(decode_bytes(bytes))
}

pub fn decode_bytes(bytes: Vec<u8>) -> String {
    if let Some((encoding, _)) = encoding_rs::Encoding::for_bom(&bytes) {
        // decode() strips the BOM it sniffs.
        let (decoded, _, _) = encoding.decode(&bytes);
        return decoded.into_owned();
    }

    // Try UTF-8 first; on failure, recover the buffer from the error
    match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(e) => {
            let bytes = e.into_bytes();
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            decoded.into_owned()
        }
    }
}
