use crate::render::Element;

pub const STYLE_ELEMENT_ID: &str = "ps-scrollfeed-styles";

/// Default look for the feed, scoped to the container id.
pub fn stylesheet(container_id: &str) -> String {
    format!(
        r#"
:root{{--ps-bg:#0b0b0d;--ps-fg:#e9e9f2;--ps-muted:#a7a7bb;--ps-card:#141421;--ps-ring:#222238}}
#{container_id}{{display:flex;flex-direction:column;gap:18px;padding:20px;max-width:720px;margin:0 auto}}
.ps-post{{background:var(--ps-card);border:1px solid var(--ps-ring);border-radius:12px;overflow:hidden;box-shadow:0 2px 6px rgba(0,0,0,.35)}}
.ps-media{{position:relative}}
.ps-embed,.ps-img{{width:100%;display:block;aspect-ratio:16/9;border:0;background:#000}}
.ps-meta,.ps-text{{padding:12px}}
.ps-title{{font-weight:700;margin:0 0 6px;color:var(--ps-fg)}}
.ps-quote p,.ps-story p{{color:var(--ps-fg)}}
.ps-tags{{display:flex;gap:6px;list-style:none;margin:0;padding:0 12px 12px;color:var(--ps-muted)}}
.ps-actions a{{color:var(--ps-fg);opacity:.8;text-decoration:none}}
.ps-actions a:hover{{opacity:1}}
.ps-skeleton .ps-media{{background:#0f0f19;height:0;padding-top:56.25%}}
.ps-skeleton .ps-title{{height:16px;width:60%;background:#1e1e2d;border-radius:6px}}
"#
    )
}

pub fn style_element(container_id: &str) -> Element {
    Element::new("style")
        .attr("id", STYLE_ELEMENT_ID)
        .text(stylesheet(container_id))
}
