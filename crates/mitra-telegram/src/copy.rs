//! Canned reply copy. HTML-lite markup only (bold + emoji); Telegram's HTML
//! parse mode handles the rest.

pub const WELCOME: &str = "🌾 <b>Welcome to Kisan Mitra!</b>\n\
    \n\
    I'm your AI farming assistant. I can help you with:\n\
    \n\
    🌤️ Weather forecasts & alerts\n\
    📊 Live market prices\n\
    🌱 Crop management & advice\n\
    🤖 AI-powered assistance\n\
    \n\
    <b>Try these commands:</b>\n\
    /help - See all commands\n\
    /weather - Current weather\n\
    /market - Market prices\n\
    /ask [question] - Ask me anything\n\
    /link - Connect your app account\n\
    \n\
    Let's grow together! 🚜";

pub const HELP: &str = "📚 <b>Available Commands</b>\n\
    \n\
    <b>Weather:</b>\n\
    /weather - Current weather\n\
    \n\
    <b>Market:</b>\n\
    /market - Top prices\n\
    \n\
    <b>AI:</b>\n\
    /ask [question] - Ask anything\n\
    Send a crop photo for diagnosis\n\
    \n\
    <b>Account:</b>\n\
    /link - Get a linking code\n\
    /unlink - Disconnect your account\n\
    \n\
    Try: /weather or /market";

// Placeholder snippet; the live weather integration is an external collaborator.
pub const WEATHER: &str = "🌤️ <b>Weather Update</b>\n\
    \n\
    📍 Location: Punjab, India\n\
    🌡️ Temperature: 28°C\n\
    💧 Humidity: 65%\n\
    🌧️ Rain: 20% chance\n\
    \n\
    💡 Good conditions for field work!";

// Placeholder snippet; the live market-data integration is an external collaborator.
pub const MARKET: &str = "📊 <b>Market Prices Today</b>\n\
    \n\
    🌾 Wheat: ₹2,200/quintal\n\
    🍚 Rice: ₹3,800/quintal\n\
    🍅 Tomato: ₹25/kg\n\
    🧅 Onion: ₹18/kg\n\
    \n\
    📍 Punjab Mandis";

pub fn ask_envelope(question: &str, answer: &str) -> String {
    format!(
        "🤖 <b>AI Response</b>\n\nQuestion: \"{}\"\n\n{}",
        escape_html(question),
        answer
    )
}

pub fn understood_fallback(text: &str) -> String {
    format!(
        "I understand: \"{}\"\n\n<b>Try these commands:</b>\n/weather - Check weather\n/market - Market prices\n/help - All commands",
        escape_html(text)
    )
}

pub fn link_issued(code: &str) -> String {
    format!(
        "🔗 <b>Linking Code</b>\n\nYour code: <code>{code}</code>\n\nEnter it in the Kisan Mitra app within 10 minutes to connect this chat.",
    )
}

pub const UNLINKED: &str = "✅ Your account has been unlinked. Send /link any time to reconnect.";

pub fn configuration_needed() -> String {
    "🤖 AI assistance is not set up yet. Please configure the Gemini API key.".to_string()
}

pub fn ai_unavailable() -> String {
    "Sorry, I encountered an error. Please try again later.".to_string()
}

pub fn photo_analysis_failed() -> String {
    "Sorry, I could not analyze the image. Please try again.".to_string()
}

/// Escape user-supplied text quoted inside HTML-lite replies.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn welcome_names_the_product() {
        assert!(WELCOME.contains("Kisan Mitra"));
        assert!(WELCOME.contains("/help"));
    }

    #[test]
    fn escape_html_neutralizes_markup() {
        assert_eq!(escape_html("<b>&hi</b>"), "&lt;b&gt;&amp;hi&lt;/b&gt;");
    }

    #[test]
    fn ask_envelope_quotes_question() {
        let reply = ask_envelope("what crop?", "Try millet");
        assert!(reply.contains("\"what crop?\""));
        assert!(reply.contains("Try millet"));
    }
}
