//! Pairing - renders link-device QR payloads for the terminal

use crate::application::errors::BotError;

/// Render a pairing payload as terminal block characters
pub fn render_qr(payload: &str) -> Result<String, BotError> {
    let payload = payload.trim();
    if payload.is_empty() {
        return Err(BotError::Parse("QR payload is empty".to_string()));
    }

    let qr = qrcode::QrCode::new(payload.as_bytes())
        .map_err(|e| BotError::Parse(format!("Failed to encode QR payload: {}", e)))?;

    Ok(qr
        .render::<qrcode::render::unicode::Dense1x2>()
        .quiet_zone(true)
        .build())
}

/// Print the QR code with scan instructions
pub fn show_qr(bot_name: &str, payload: &str) {
    match render_qr(payload) {
        Ok(code) => {
            println!("\n📱 Scan this QR code to link {}:", bot_name);
            println!("   WhatsApp > Linked devices > Link a device\n");
            println!("{}", code);
            tracing::info!("Waiting for QR scan...");
        }
        Err(e) => tracing::warn!("Could not render pairing QR: {}", e),
    }
}
