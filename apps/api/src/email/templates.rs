//! HTML bodies for outgoing email.

const BRAND: &str = "Folio";

#[derive(Debug, Clone)]
pub struct EmailMessage {
    pub subject: String,
    pub html: String,
}

pub fn verification_email(frontend_url: &str, name: &str, token: &str) -> EmailMessage {
    let link = format!("{frontend_url}/verify-email?token={token}");
    EmailMessage {
        subject: format!("Verify your email - {BRAND}"),
        html: render(
            name,
            "Welcome! Please verify your email address to start generating your portfolio.",
            &link,
            "Verify My Email",
            "This link expires in 24 hours. If you didn't create this account, just ignore this email.",
        ),
    }
}

pub fn reset_email(frontend_url: &str, name: &str, token: &str) -> EmailMessage {
    let link = format!("{frontend_url}/reset-password?token={token}");
    EmailMessage {
        subject: format!("Reset your password - {BRAND}"),
        html: render(
            name,
            "You requested a password reset. Click the button below to set a new password.",
            &link,
            "Reset Password",
            "This link expires in 30 minutes. If you didn't request this, just ignore this email.",
        ),
    }
}

fn render(name: &str, intro: &str, link: &str, button: &str, footer: &str) -> String {
    let name = escape_html(name);
    format!(
        r#"<div style="font-family: 'Inter', Arial, sans-serif; max-width: 500px; margin: 0 auto; padding: 40px 20px;">
    <h1 style="color: #6366f1; font-size: 24px; margin-bottom: 8px;">{BRAND}</h1>
    <p style="font-size: 16px; color: #333;">Hey {name},</p>
    <p style="font-size: 14px; color: #555; line-height: 1.6;">{intro}</p>
    <a href="{link}"
       style="display: inline-block; background: linear-gradient(135deg, #6366f1, #8b5cf6);
              color: white; padding: 12px 32px; border-radius: 8px; text-decoration: none;
              font-weight: 600; font-size: 14px; margin: 20px 0;">{button}</a>
    <p style="font-size: 12px; color: #999; margin-top: 24px;">{footer}</p>
</div>"#
    )
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_email_links_reset_page() {
        let msg = reset_email("https://folio.app", "Ada", "abc");
        assert!(msg.subject.starts_with("Reset your password"));
        assert!(msg.html.contains("https://folio.app/reset-password?token=abc"));
        assert!(msg.html.contains("30 minutes"));
    }

    #[test]
    fn test_verification_email_mentions_expiry() {
        let msg = verification_email("https://folio.app", "Ada", "abc");
        assert!(msg.html.contains("24 hours"));
        assert!(msg.html.contains("Hey Ada,"));
    }

    #[test]
    fn test_user_name_is_escaped() {
        let msg = verification_email("https://folio.app", "<script>alert(1)</script>", "t");
        assert!(!msg.html.contains("<script>"));
        assert!(msg.html.contains("&lt;script&gt;"));
    }
}
