// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Bilingual email templates.
//!
//! Two messages go out per accepted submission: a notification to the site
//! owner and an acknowledgment to the visitor. Both are rendered as HTML with
//! a plain-text alternative. Visitor-supplied text is always HTML-escaped.

use crate::config::SiteConfig;
use crate::validator::ContactSubmission;

/// Supported template languages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    #[default]
    En,
    Es,
}

impl Locale {
    /// Resolve a locale tag such as `es` or `es-MX`. Unknown tags fall back to English.
    pub fn from_tag(tag: &str) -> Self {
        let primary = tag.split(['-', '_']).next().unwrap_or("").trim();
        if primary.eq_ignore_ascii_case("es") {
            Locale::Es
        } else {
            Locale::En
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Es => "es",
        }
    }
}

/// A rendered message, ready for the mailer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedEmail {
    pub subject: String,
    pub html: String,
    pub text: String,
}

struct NotificationStrings {
    subject_prefix: &'static str,
    preview: (&'static str, &'static str),
    title: &'static str,
    intro: &'static str,
    name_label: &'static str,
    email_label: &'static str,
    message_label: &'static str,
    footer: &'static str,
}

struct AutoResponseStrings {
    subject_prefix: &'static str,
    preview: (&'static str, &'static str),
    title: &'static str,
    greeting: &'static str,
    intro: &'static str,
    urgent_title: &'static str,
    urgent_text: &'static str,
    learn_more: &'static str,
    portfolio_link: &'static str,
    portfolio_text: &'static str,
    linkedin_link: &'static str,
    github_link: &'static str,
    signature: &'static str,
    footer: &'static str,
}

const NOTIFICATION_EN: NotificationStrings = NotificationStrings {
    subject_prefix: "New inquiry from",
    preview: ("New inquiry from ", " on your portfolio"),
    title: "New Contact Inquiry",
    intro: "You have received a new message from your portfolio:",
    name_label: "Name:",
    email_label: "Email:",
    message_label: "Message:",
    footer: "This message was sent from your portfolio contact form",
};

const NOTIFICATION_ES: NotificationStrings = NotificationStrings {
    subject_prefix: "Nueva consulta de",
    preview: ("Nueva consulta de ", " en tu portafolio"),
    title: "Nueva Consulta de Contacto",
    intro: "Has recibido un nuevo mensaje desde tu portafolio:",
    name_label: "Nombre:",
    email_label: "Email:",
    message_label: "Mensaje:",
    footer: "Este mensaje fue enviado desde el formulario de contacto de tu portafolio",
};

const AUTO_RESPONSE_EN: AutoResponseStrings = AutoResponseStrings {
    subject_prefix: "Thank you for contacting me -",
    preview: ("Thank you for contacting me, ", ""),
    title: "Thank You for Reaching Out",
    greeting: "Hello",
    intro: "I have received your message and I want to thank you for taking the time to contact me. \
            I will get back to you as soon as possible, usually within 24-48 hours.",
    urgent_title: "Need an urgent response?",
    urgent_text: "If your project requires immediate attention, feel free to send me a direct message at",
    learn_more: "In the meantime, if you want to learn more about my work, I invite you to:",
    portfolio_link: "View my recent projects on",
    portfolio_text: "my portfolio",
    linkedin_link: "Review my professional experience on",
    github_link: "Explore my code on",
    signature: "Best regards,",
    footer: "This is an automated confirmation message. Please do not reply to this email. To contact me, write to",
};

const AUTO_RESPONSE_ES: AutoResponseStrings = AutoResponseStrings {
    subject_prefix: "Gracias por contactarme -",
    preview: ("Gracias por contactarme, ", ""),
    title: "Gracias por contactarme",
    greeting: "Hola",
    intro: "He recibido tu mensaje y quiero agradecerte por tomarte el tiempo de contactarme. \
            Me pondré en contacto contigo lo antes posible, generalmente en un plazo de 24-48 horas.",
    urgent_title: "¿Necesitas una respuesta urgente?",
    urgent_text: "Si tu proyecto requiere atención inmediata, no dudes en enviarme un mensaje directo a",
    learn_more: "Mientras tanto, si quieres conocer más sobre mi trabajo, te invito a:",
    portfolio_link: "Ver mis proyectos recientes en",
    portfolio_text: "mi portafolio",
    linkedin_link: "Revisar mi experiencia profesional en",
    github_link: "Explorar mi código en",
    signature: "Saludos,",
    footer: "Este es un mensaje automático de confirmación. Por favor no respondas a este correo. Para contactarme, escribe a",
};

const STYLE_BODY: &str = "background-color:#ffffff;font-family:-apple-system,BlinkMacSystemFont,'Segoe UI',Roboto,'Helvetica Neue',sans-serif";
const STYLE_PREVIEW: &str = "display:none;overflow:hidden;line-height:1px;opacity:0;max-height:0;max-width:0";
const STYLE_CONTAINER: &str = "margin:0 auto;padding:20px 20px 48px;max-width:580px";
const STYLE_H1: &str = "color:#1a1a1a;font-size:32px;font-weight:700;margin:40px 0;line-height:1.2";
const STYLE_TEXT: &str = "color:#525252;font-size:16px;line-height:26px;margin:16px 0";
const STYLE_LABEL: &str = "color:#737373;font-size:14px;font-weight:600;margin:0";
const STYLE_MESSAGE: &str = "background-color:#f5f5f5;border-radius:8px;padding:16px;color:#1a1a1a;font-size:15px;line-height:24px;white-space:pre-wrap";
const STYLE_CALLOUT: &str = "background-color:#f0f9ff;border-radius:8px;padding:24px;margin:32px 0;border:1px solid #bae6fd";
const STYLE_LINK: &str = "color:#0369a1;text-decoration:underline";
const STYLE_FOOTER: &str = "color:#a3a3a3;font-size:12px;line-height:18px";
const HR: &str = "<hr style=\"border-color:#e5e5e5;margin:24px 0\">";

/// Renders both messages for a submission.
pub struct Templates {
    site: SiteConfig,
}

impl Templates {
    pub fn new(site: SiteConfig) -> Self {
        Self { site }
    }

    /// Message to the site owner carrying the visitor's inquiry.
    pub fn notification(&self, submission: &ContactSubmission) -> RenderedEmail {
        let locale = Locale::from_tag(&submission.locale);
        let t = match locale {
            Locale::En => &NOTIFICATION_EN,
            Locale::Es => &NOTIFICATION_ES,
        };

        let name = escape_html(&submission.name);
        let email = escape_html(&submission.email);
        let message = escape_html(&submission.message);
        let site = escape_html(&self.site.site_url);

        let mut html = document_open(locale, &preview(t.preview, &name));
        html.push_str(&format!(
            "<h1 style=\"{STYLE_H1}\">{title}</h1>\
             <p style=\"{STYLE_TEXT}\">{intro}</p>{HR}\
             <p style=\"{STYLE_LABEL}\">{name_label}</p><p style=\"{STYLE_TEXT}\">{name}</p>{HR}\
             <p style=\"{STYLE_LABEL}\">{email_label}</p>\
             <p style=\"{STYLE_TEXT}\"><a href=\"mailto:{email}\" style=\"{STYLE_LINK}\">{email}</a></p>{HR}\
             <p style=\"{STYLE_LABEL}\">{message_label}</p>\
             <div style=\"{STYLE_MESSAGE}\">{message}</div>{HR}\
             <p style=\"{STYLE_FOOTER}\">{footer} ({site})</p>",
            title = t.title,
            intro = t.intro,
            name_label = t.name_label,
            email_label = t.email_label,
            message_label = t.message_label,
            footer = t.footer,
        ));
        html.push_str(DOCUMENT_CLOSE);

        let text = format!(
            "{title}\n\n{intro}\n\n{name_label} {name}\n{email_label} {email}\n\n{message_label}\n{message}\n\n-- \n{footer} ({site})\n",
            title = t.title,
            intro = t.intro,
            name_label = t.name_label,
            name = submission.name,
            email_label = t.email_label,
            email = submission.email,
            message_label = t.message_label,
            message = submission.message,
            footer = t.footer,
            site = self.site.site_url,
        );

        RenderedEmail {
            subject: format!("{} {}", t.subject_prefix, submission.name),
            html,
            text,
        }
    }

    /// Acknowledgment sent back to the visitor.
    pub fn auto_response(&self, submission: &ContactSubmission) -> RenderedEmail {
        let locale = Locale::from_tag(&submission.locale);
        let t = match locale {
            Locale::En => &AUTO_RESPONSE_EN,
            Locale::Es => &AUTO_RESPONSE_ES,
        };
        let site = &self.site;

        let name = escape_html(&submission.name);
        let owner = escape_html(&site.owner_name);
        let owner_title = escape_html(&site.owner_title);
        let contact = escape_html(&site.contact_address);
        let projects = escape_html(&format!("{}#projects", site.site_url.trim_end_matches('/')));
        let linkedin = escape_html(&site.linkedin_url);
        let github = escape_html(&site.github_url);

        let mut html = document_open(locale, &preview(t.preview, &name));
        html.push_str(&format!(
            "<h1 style=\"{STYLE_H1}\">{title}</h1>\
             <p style=\"{STYLE_TEXT}\">{greeting} {name},</p>\
             <p style=\"{STYLE_TEXT}\">{intro}</p>\
             <div style=\"{STYLE_CALLOUT}\"><p style=\"{STYLE_TEXT}\"><strong>{urgent_title}</strong></p>\
             <p style=\"{STYLE_TEXT}\">{urgent_text} <a href=\"mailto:{contact}\" style=\"{STYLE_LINK}\">{contact}</a></p></div>\
             <p style=\"{STYLE_TEXT}\">{learn_more}</p>\
             <ul>\
             <li style=\"{STYLE_TEXT}\">{portfolio_link} <a href=\"{projects}\" style=\"{STYLE_LINK}\">{portfolio_text}</a></li>\
             <li style=\"{STYLE_TEXT}\">{linkedin_link} <a href=\"{linkedin}\" style=\"{STYLE_LINK}\">LinkedIn</a></li>\
             <li style=\"{STYLE_TEXT}\">{github_link} <a href=\"{github}\" style=\"{STYLE_LINK}\">GitHub</a></li>\
             </ul>{HR}\
             <p style=\"{STYLE_TEXT}\">{signature}<br><strong>{owner}</strong><br>{owner_title}</p>{HR}\
             <p style=\"{STYLE_FOOTER}\">{footer} <a href=\"mailto:{contact}\" style=\"{STYLE_LINK}\">{contact}</a></p>",
            title = t.title,
            greeting = t.greeting,
            intro = t.intro,
            urgent_title = t.urgent_title,
            urgent_text = t.urgent_text,
            learn_more = t.learn_more,
            portfolio_link = t.portfolio_link,
            portfolio_text = t.portfolio_text,
            linkedin_link = t.linkedin_link,
            github_link = t.github_link,
            signature = t.signature,
            footer = t.footer,
        ));
        html.push_str(DOCUMENT_CLOSE);

        let text = format!(
            "{greeting} {name},\n\n{intro}\n\n{urgent_title}\n{urgent_text} {contact}\n\n{learn_more}\n\
             - {portfolio_link} {portfolio_text}: {projects}\n\
             - {linkedin_link} LinkedIn: {linkedin}\n\
             - {github_link} GitHub: {github}\n\n\
             {signature}\n{owner}\n{owner_title}\n\n-- \n{footer} {contact}\n",
            greeting = t.greeting,
            name = submission.name,
            intro = t.intro,
            urgent_title = t.urgent_title,
            urgent_text = t.urgent_text,
            contact = site.contact_address,
            learn_more = t.learn_more,
            portfolio_link = t.portfolio_link,
            portfolio_text = t.portfolio_text,
            projects = format!("{}#projects", site.site_url.trim_end_matches('/')),
            linkedin_link = t.linkedin_link,
            linkedin = site.linkedin_url,
            github_link = t.github_link,
            github = site.github_url,
            signature = t.signature,
            owner = site.owner_name,
            owner_title = site.owner_title,
            footer = t.footer,
        );

        RenderedEmail {
            subject: format!("{} {}", t.subject_prefix, site.owner_name),
            html,
            text,
        }
    }
}

const DOCUMENT_CLOSE: &str = "</div></body></html>";

/// Inbox preview line; `name` must already be escaped.
fn preview((prefix, suffix): (&str, &str), name: &str) -> String {
    format!("{prefix}{name}{suffix}")
}

fn document_open(locale: Locale, preview: &str) -> String {
    format!(
        "<!DOCTYPE html><html lang=\"{}\"><head><meta charset=\"utf-8\">\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\"></head>\
         <body style=\"{STYLE_BODY}\">\
         <div style=\"{STYLE_PREVIEW}\">{preview}</div>\
         <div style=\"{STYLE_CONTAINER}\">",
        locale.as_str()
    )
}

/// Escape text for use in HTML element content and quoted attributes.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
