use crate::models::{OutboundEmail, Sender};

pub const VERIFICATION_SUBJECT: &str = "Correo de verificación a TibiBalance";

// escape for use inside a double-quoted attribute
fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Build the verification message for `to` with `link` as the call to action.
pub fn verification_email(to: &str, from: &Sender, link: &str) -> OutboundEmail {
    OutboundEmail {
        to: to.to_string(),
        from: from.clone(),
        subject: VERIFICATION_SUBJECT.to_string(),
        html: verification_html(link),
    }
}

fn verification_html(link: &str) -> String {
    format!(
        r##"<!DOCTYPE html>
<html lang="es">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>Confirmación de correo - TIBIBALANCE</title>
  <style>
    body {{
      margin: 0;
      padding: 0;
      background: #f2f6f9;
      font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif;
    }}
    .container {{
      max-width: 480px;
      margin: 50px auto;
      background: #ffffff;
      border-radius: 16px;
      box-shadow: 0 8px 24px rgba(0, 0, 0, 0.1);
      padding: 32px 24px;
      text-align: center;
    }}
    .logo {{
      font-size: 28px;
      font-weight: 700;
      color: #00897B;
      margin-bottom: 16px;
    }}
    .image-container {{
      margin: 24px auto;
    }}
    .image-container img {{
      width: 120px;
      height: auto;
    }}
    .title {{
      font-size: 22px;
      color: #333333;
      font-weight: bold;
      margin-bottom: 16px;
    }}
    .text {{
      font-size: 16px;
      color: #555555;
      margin-bottom: 28px;
      line-height: 1.5;
    }}
    .button {{
      background-color: #007BFF;
      color: #ffffff;
      text-decoration: none;
      padding: 14px 28px;
      font-size: 16px;
      font-weight: bold;
      border-radius: 24px;
      display: inline-block;
    }}
    .footer {{
      font-size: 14px;
      color: #888888;
      margin-top: 32px;
      line-height: 1.4;
    }}
    @media (max-width: 500px) {{
      .container {{
        margin: 20px;
        padding: 24px 16px;
      }}
      .title {{
        font-size: 20px;
      }}
      .text, .footer {{
        font-size: 15px;
      }}
    }}
  </style>
</head>
<body>
  <div class="container">
    <div class="logo">TIBIBALANCE</div>
    <div class="image-container">
      <img src="https://i.imgur.com/mCen4Hs.png" alt="Frijolito confirmando">
    </div>
    <div class="title">Confirma tu correo electrónico</div>
    <div class="text">
      Hola:<br><br>
      Gracias por registrarte en <strong>Tibibalance</strong>.<br>
      Por favor confirma tu correo electrónico para empezar a usar la app.
    </div>
    <a href="{href}" class="button">Confirmar correo electrónico</a>
    <div class="footer">
      Si no fuiste tú, puedes ignorar este correo electrónico<br>
      de manera segura.
    </div>
  </div>
</body>
</html>
"##,
        href = escape_attr(link)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sender() -> Sender {
        Sender {
            email: "noreply@example.com".to_string(),
            name: "TibiBalance Team".to_string(),
        }
    }

    #[test]
    fn message_embeds_link_as_button_target() {
        let link = "https://example.firebaseapp.com/__/auth/action?oobCode=abc123";
        let message = verification_email("a@x.com", &sender(), link);

        assert_eq!(message.to, "a@x.com");
        assert_eq!(message.from, sender());
        assert_eq!(message.subject, VERIFICATION_SUBJECT);
        assert!(message.html.contains(&format!("<a href=\"{}\"", link)));
    }

    #[test]
    fn link_is_attribute_escaped() {
        let message = verification_email("a@x.com", &sender(), "https://x/?a=1&b=\"2\"");
        assert!(message.html.contains("href=\"https://x/?a=1&amp;b=&quot;2&quot;\""));
    }
}
