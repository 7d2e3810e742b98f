// ABOUTME: Shared stylesheet fragment injected once per page for converted grids.
// ABOUTME: Guarded by a singleton id so every converter and instance shares one <style>.

use dom_query::Document;

use crate::dom::selectors::get_or_compile;

/// Id of the singleton `<style>` element.
pub const STYLE_ID: &str = "storefront-carousel-styles";

/// Rules for the default marker classes. Not removed on revert: the fragment is page-level.
const CAROUSEL_CSS: &str = "\
.carousel-initialized{position:relative;overflow:hidden}\
.carousel-initialized>.swiper-wrapper{display:flex;flex-wrap:nowrap}\
.carousel-initialized .swiper-slide{flex-shrink:0}\
.swiper-button-prev[hidden],.swiper-button-next[hidden],.swiper-pagination[hidden]{display:none}\
.swiper-button-disabled{opacity:.35;cursor:auto;pointer-events:none}\
.swiper-pagination-bullet{cursor:pointer}";

/// True when the shared stylesheet is already present.
pub fn has_stylesheet(doc: &Document) -> bool {
    get_or_compile(&format!("style#{}", STYLE_ID))
        .map(|m| !doc.select_matcher(&m).is_empty())
        .unwrap_or(false)
}

/// Appends the shared stylesheet to `<head>` (or the document root) unless present.
///
/// Returns true when this call inserted it.
pub fn ensure_stylesheet(doc: &Document) -> bool {
    if has_stylesheet(doc) {
        return false;
    }
    let style = doc.tree.new_element("style");
    style.set_attr("id", STYLE_ID);
    style.append_html(CAROUSEL_CSS);

    let head = get_or_compile("head").and_then(|m| doc.select_matcher(&m).nodes().first().cloned());
    match head {
        Some(head) => head.append_child(&style),
        None => doc.root().append_child(&style),
    }
    true
}
