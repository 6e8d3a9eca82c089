//! Page shell shared by every view.

use super::escape;

/// Wrap `content` in the document shell. `content` must already be escaped.
pub fn render(title: &str, content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<link rel="stylesheet" href="/css/style.css">
<title>Natours | {title}</title>
</head>
<body>
<header class="header">
<nav class="nav nav--tours"><a class="nav__el" href="/">All tours</a></nav>
<nav class="nav nav--user"><a class="nav__el nav__el--cta" href="/signup">Sign up</a></nav>
</header>
<main class="main">
{content}
</main>
<footer class="footer"><p class="footer__copyright">&copy; Natours</p></footer>
</body>
</html>
"#,
        title = escape(title),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_is_escaped() {
        let html = render("<b>", "<p>ok</p>");
        assert!(html.contains("<title>Natours | &lt;b&gt;</title>"));
        assert!(html.contains("<p>ok</p>"));
    }
}
