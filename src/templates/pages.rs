//! Individual pages.

use std::fmt::Write;

use super::{escape, layout};
use crate::resources::tours::Tour;

pub fn overview(tours: &[Tour]) -> String {
    let mut cards = String::from(r#"<div class="card-container">"#);
    for tour in tours {
        let _ = write!(
            cards,
            r#"
<div class="card">
<h3 class="heading-tertirary"><span>{name}</span></h3>
<p class="card__text">{summary}</p>
<p class="card__data">{duration}-day tour, up to {size} people</p>
<p><span class="card__footer-value">${price}</span> per person</p>
<p><span class="card__footer-value">{rating}</span> rating ({quantity})</p>
<a class="btn btn--green btn--small" href="/tour/{slug}">Details</a>
</div>"#,
            name = escape(&tour.name),
            summary = escape(&tour.summary),
            duration = tour.duration,
            size = tour.max_group_size,
            price = tour.price,
            rating = tour.ratings_average,
            quantity = tour.ratings_quantity,
            slug = escape(&tour.slug),
        );
    }
    cards.push_str("\n</div>");
    layout::render("All Tours", &cards)
}

pub fn tour_detail(tour: &Tour) -> String {
    let content = format!(
        r#"<section class="section-header">
<h1 class="heading-primary"><span>{name} tour</span></h1>
<p>{duration} days, up to {size} people, {difficulty:?}</p>
</section>
<section class="section-description">
<p class="description__text">{description}</p>
<p>${price} per person, rated {rating} ({quantity} reviews)</p>
</section>"#,
        name = escape(&tour.name),
        duration = tour.duration,
        size = tour.max_group_size,
        difficulty = tour.difficulty,
        description = escape(&tour.description),
        price = tour.price,
        rating = tour.ratings_average,
        quantity = tour.ratings_quantity,
    );
    layout::render(&format!("{} Tour", tour.name), &content)
}

pub fn signup_form() -> String {
    let content = r#"<div class="login-form">
<h2 class="heading-secondary ma-bt-lg">Create your account</h2>
<form class="form form--signup" method="post" action="/api/v1/users/signup">
<div class="form__group"><label class="form__label" for="name">Your name</label>
<input class="form__input" id="name" name="name" type="text" required></div>
<div class="form__group"><label class="form__label" for="email">Email address</label>
<input class="form__input" id="email" name="email" type="email" required></div>
<div class="form__group"><label class="form__label" for="password">Password</label>
<input class="form__input" id="password" name="password" type="password" minlength="8" required></div>
<div class="form__group"><label class="form__label" for="passwordConfirm">Confirm password</label>
<input class="form__input" id="passwordConfirm" name="passwordConfirm" type="password" minlength="8" required></div>
<div class="form__group"><button class="btn btn--green">Sign up</button></div>
</form>
</div>"#;
    layout::render("Sign up", content)
}

/// Error view shown to browsers.
pub fn error_page(message: &str) -> String {
    let content = format!(
        r#"<div class="error">
<div class="error__title">
<h2 class="heading-secondary heading-secondary--error">Uh oh! Something went wrong!</h2>
</div>
<div class="error__msg">{message}</div>
</div>"#,
        message = escape(message),
    );
    layout::render("Something went wrong!", &content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::tours::NewTour;
    use serde_json::json;

    fn tour() -> Tour {
        let input: NewTour = serde_json::from_value(json!({
            "name": "The Snow Adventurer",
            "duration": 4,
            "maxGroupSize": 10,
            "difficulty": "difficult",
            "price": 997,
            "summary": "Exciting <adventure>"
        }))
        .unwrap();
        input.into_tour()
    }

    #[test]
    fn test_overview_links_to_slug() {
        let html = overview(&[tour()]);
        assert!(html.contains(r#"href="/tour/the-snow-adventurer""#));
        assert!(html.contains("Exciting &lt;adventure&gt;"));
    }

    #[test]
    fn test_error_page_escapes_message() {
        let html = error_page("Can't find /<x> on this server! ");
        assert!(html.contains("Can&#39;t find /&lt;x&gt; on this server! "));
        assert!(html.contains("<title>Natours | Something went wrong!</title>"));
    }

    #[test]
    fn test_signup_form_fields() {
        let html = signup_form();
        for field in ["name", "email", "password", "passwordConfirm"] {
            assert!(html.contains(&format!(r#"name="{field}""#)));
        }
    }
}
