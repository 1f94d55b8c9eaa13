//! End-to-end render tests: template text in, rendered string out.
//!
//! Whitespace matters in these expectations. Markup nested in a code block
//! keeps the whitespace between its last element and the end of the line,
//! plus the indentation of the following line.

use pretty_assertions::assert_eq;
use serde_json::json;

use razor_template::{compile, compile_with_options, CompileOptions};

fn render(source: &str) -> String {
    compile(source)
        .unwrap_or_else(|e| panic!("compile failed for {:?}: {}", source, e))
        .render_empty()
        .unwrap_or_else(|e| panic!("render failed for {:?}: {}", source, e))
}

fn render_with(source: &str, model: serde_json::Value) -> String {
    compile(source)
        .unwrap_or_else(|e| panic!("compile failed for {:?}: {}", source, e))
        .render(&model)
        .unwrap_or_else(|e| panic!("render failed for {:?}: {}", source, e))
}

// ---------------------------------------------------------------------------
// Plain text and expressions

#[test]
fn test_plain_text_is_unchanged() {
    let source = r#"<a href="">this is a <br /> simple template</a>"#;
    assert_eq!(render(source), source);
}

#[test]
fn test_lone_expression() {
    assert_eq!(render_with("@i", json!({ "i": 2 })), "2");
}

#[test]
fn test_expression_output_is_not_escaped() {
    assert_eq!(
        render_with("@i", json!({ "i": r#"<li class="what"></li>"# })),
        r#"<li class="what"></li>"#
    );
}

#[test]
fn test_attribute_and_content_interpolation() {
    assert_eq!(
        render_with(
            r#"<li class="@className">@itemName</li>"#,
            json!({ "className": "blue", "itemName": "the blue item" })
        ),
        r#"<li class="blue">the blue item</li>"#
    );
}

#[test]
fn test_property_reference() {
    assert_eq!(
        render_with("<li>@model.name</li>", json!({ "model": { "name": "what" } })),
        "<li>what</li>"
    );
}

#[test]
fn test_simple_explicit_expression() {
    assert_eq!(render(r#"<a href="@(true)"></a>"#), r#"<a href="true"></a>"#);
}

#[test]
fn test_explicit_expression_with_nested_parens() {
    let source =
        r#"<a href="@( true == (Math.random() + 1 >= 1 ? true : false) ? "red" : "blue" )"></a>"#;
    assert_eq!(render(source), r#"<a href="red"></a>"#);
}

#[test]
fn test_indexed_property() {
    assert_eq!(
        render_with(r#"<a href="@what.how[0]"></a>"#, json!({ "what": { "how": "G" } })),
        r#"<a href="G"></a>"#
    );
}

#[test]
fn test_method_call_then_index() {
    let source = r#"@{ var what = { how: function() { return 'G'; } }; }<a href="@what.how()[0]"></a>"#;
    assert_eq!(render(source), r#"<a href="G"></a>"#);
}

#[test]
fn test_expressions_mixed_with_text() {
    assert_eq!(
        render_with("Hello @title. @name.", json!({ "title": "Mr", "name": "Doob" })),
        "Hello Mr. Doob."
    );
}

#[test]
fn test_null_and_undefined_render_empty() {
    assert_eq!(render_with("[@a][@(undefined)]", json!({ "a": null })), "[][]");
}

#[test]
fn test_model_field_named_like_the_buffer() {
    assert_eq!(
        render_with("<p>@a</p>", json!({ "a": 1, "__vout": 1 })),
        "<p>1</p>"
    );
}

#[test]
fn test_null_model_leaves_names_unbound() {
    assert_eq!(render_with("<p>@(typeof a)</p>", json!(null)), "<p>undefined</p>");
}

#[test]
fn test_assignment_to_model_field_is_visible_later() {
    assert_eq!(
        render_with("@{ count = count + 1; }<b>@count</b>", json!({ "count": 1 })),
        "<b>2</b>"
    );
}

// ---------------------------------------------------------------------------
// Escapes and comments

#[test]
fn test_email_address_stays_text() {
    assert_eq!(render("Hi philha@example.com"), "Hi philha@example.com");
}

#[test]
fn test_explicit_expression_after_word() {
    assert_eq!(
        render_with("<span>ISBN@(isbnNumber)</span>", json!({ "isbnNumber": 10101 })),
        "<span>ISBN10101</span>"
    );
}

#[test]
fn test_escaped_at() {
    assert_eq!(
        render("<span>In Razor, you use the @@foo to display the value of foo</span>"),
        "<span>In Razor, you use the @foo to display the value of foo</span>"
    );
}

#[test]
fn test_comment_outputs_nothing() {
    let source = "@* \nThis is a server side \nmultiline comment \n*@";
    assert_eq!(render(source), "");
}

#[test]
fn test_comment_followed_by_text() {
    let source = "@* \nThis is a server side \nmultiline comment \n*@ and this content should be";
    assert_eq!(render(source), " and this content should be");
}

// ---------------------------------------------------------------------------
// Loops

#[test]
fn test_for_block_without_markup() {
    assert_eq!(render("@for(var i = 0; i < 10; i++){ \n }"), "");
}

#[test]
fn test_for_block_with_markup() {
    assert_eq!(
        render("@for(var i = 0; i < 1; i++){ <li class=\"\">list item</li> \n }"),
        "<li class=\"\">list item</li> \n "
    );
}

#[test]
fn test_for_block_with_attribute_expression() {
    assert_eq!(
        render("@for(var i = 0; i < 1; i++){ <li class=\"@i\">list item</li> \n }"),
        "<li class=\"0\">list item</li> \n "
    );
}

#[test]
fn test_for_block_with_complex_attribute_expression() {
    assert_eq!(
        render(
            "@for(var i = 0; i < 1; i++){ <li class=\"@(i % 2 == 0 ? \"blue\" : \"red\")\">list item</li> \n }"
        ),
        "<li class=\"blue\">list item</li> \n "
    );
}

#[test]
fn test_nested_for_in_code() {
    assert_eq!(
        render(
            "@for(var i = 0; i < 1; i++){ for(var j = 0; j < 2; j++) { <li class=\"@(i % 2 == 0 ? \"blue\" : \"red\")\">list item</li> \n } }"
        ),
        "<li class=\"blue\">list item</li> \n <li class=\"blue\">list item</li> \n "
    );
}

#[test]
fn test_nested_for_blocks_on_new_lines() {
    let source = concat!(
        "@for(var i = 0; i < somearr.length; i++){ \n",
        "\t<li class=\"@(i % 2 === 0 ? 'even' : 'odd')\">Some element, number @i, value @somearr[i]</li> \n",
        "\t@for(var j = 0; j < anotherarr.length; j++){",
        "\t\t<li class=\"@j-what\">some text, @( (j+2) % 2 === 0 ? 'even' : 'odd' ), value @anotherarr[j]</li> \n",
        "\t}",
        "}"
    );
    let model = json!({
        "somearr": ["a", "b", "c", "d"],
        "anotherarr": ["z", "y", "x", "w"],
    });

    let mut expected = String::new();
    for (i, outer) in ["a", "b", "c", "d"].iter().enumerate() {
        let parity = if i % 2 == 0 { "even" } else { "odd" };
        expected.push_str(&format!(
            "<li class=\"{}\">Some element, number {}, value {}</li> \n\t",
            parity, i, outer
        ));
        for (j, inner) in ["z", "y", "x", "w"].iter().enumerate() {
            let parity = if (j + 2) % 2 == 0 { "even" } else { "odd" };
            expected.push_str(&format!(
                "<li class=\"{}-what\">some text, {}, value {}</li> \n\t",
                j, parity, inner
            ));
        }
    }
    assert_eq!(render_with(source, model), expected);
}

#[test]
fn test_while_with_manual_increment() {
    assert_eq!(
        render("@{ var countNum = 0; while(countNum < 1){ \n countNum += 1; \n <p>Line #@countNum</p> \n } }"),
        "<p>Line #1</p> \n "
    );
}

#[test]
fn test_while_with_increment_after_markup() {
    assert_eq!(
        render("@{ var countNum = 0; while(countNum < 2){ \n countNum += 1; \n <p>Line #@countNum</p> \n countNum += 1; \n } }"),
        "<p>Line #1</p> \n "
    );
}

// ---------------------------------------------------------------------------
// try / catch / finally

#[test]
fn test_empty_try_catch() {
    assert_eq!(render("@try { var i = 0; } catch(e){  }"), "");
}

#[test]
fn test_catch_block_outputs_markup() {
    assert_eq!(
        render("@try { throw new Error('error') } catch(e){ <li>list item</li> \n }"),
        "<li>list item</li> \n "
    );
}

#[test]
fn test_try_block_outputs_markup() {
    assert_eq!(
        render("@try { <li>list item</li> \n } catch(e){  }"),
        "<li>list item</li> \n "
    );
}

#[test]
fn test_try_catch_finally() {
    assert_eq!(
        render("@try { <li>list item</li> \n } catch(e){  } finally{ <li>list item 2</li> \n }"),
        "<li>list item</li> \n <li>list item 2</li> \n "
    );
}

#[test]
fn test_if_else_chain() {
    let source = "@if (n > 1) { <b>many</b> } else if (n == 1) { <b>one</b> } else { <b>none</b> }";
    assert_eq!(render_with(source, json!({ "n": 5 })), "<b>many</b> ");
    assert_eq!(render_with(source, json!({ "n": 1 })), "<b>one</b> ");
    assert_eq!(render_with(source, json!({ "n": 0 })), "<b>none</b> ");
}

// ---------------------------------------------------------------------------
// Anonymous blocks and functions

#[test]
fn test_empty_anonymous_block() {
    assert_eq!(render("@{ }"), "");
}

#[test]
fn test_anonymous_block_with_at_markup_and_explicit_close() {
    assert_eq!(render("@{ @<li>list item</li> @}"), "<li>list item</li> ");
}

#[test]
fn test_anonymous_block_with_explicit_close() {
    assert_eq!(render("@{ <li>list item</li> @}"), "<li>list item</li> ");
}

#[test]
fn test_anonymous_block() {
    assert_eq!(
        render("@{ <li class=\"1\">list item</li> \n }"),
        "<li class=\"1\">list item</li> \n "
    );
}

#[test]
fn test_nested_anonymous_blocks() {
    assert_eq!(
        render("@{ <li class=\"1\">list item</li> @{ <li class=\"2\">list item</li> \n } \n }"),
        "<li class=\"1\">list item</li> <li class=\"2\">list item</li> \n "
    );
}

#[test]
fn test_anonymous_block_with_nested_for() {
    assert_eq!(
        render("@{ <li class=\"1\">list item</li> @for(var i = 0; i < 1; i++){ <li class=\"2\">list item</li> \n } \n }"),
        "<li class=\"1\">list item</li> <li class=\"2\">list item</li> \n "
    );
}

#[test]
fn test_declared_function_is_not_run() {
    assert_eq!(
        render("@{ <li class=\"1\">list item</li> @function testFunc(param1, param2){ <li class=\"2\">list item</li> \n } \n }"),
        "<li class=\"1\">list item</li> "
    );
}

#[test]
fn test_declared_function_called() {
    assert_eq!(
        render("@{ <li class=\"1\">list item</li> @function testFunc(param1, param2){ <li class=\"2\">list item</li> \n } testFunc(); \n }"),
        "<li class=\"1\">list item</li> <li class=\"2\">list item</li> \n "
    );
}

#[test]
fn test_function_called_before_its_declaration() {
    assert_eq!(
        render("@{ f(); <p>a</p>\n @function f(){ <b>x</b> \n } \n }"),
        "<b>x</b> \n <p>a</p>\n "
    );
}

#[test]
fn test_top_level_function_called_from_earlier_block() {
    assert_eq!(render("@{ g(); }@function g(){ <b>g</b> \n }"), "<b>g</b> \n ");
}

#[test]
fn test_explicit_close_returns_to_markup() {
    assert_eq!(
        render("@{ var a = 0; a += 1; <span>text</span> @}<span>text</span>"),
        "<span>text</span> <span>text</span>"
    );
}

#[test]
fn test_same_line_close_after_markup() {
    // The space before `}` belongs to the markup, the one after it to the
    // document
    assert_eq!(
        render("@{ var a = 0; a += 1; <span>text</span> } <span>text</span>"),
        "<span>text</span>  <span>text</span>"
    );
}

// ---------------------------------------------------------------------------
// Text escapes and multi-line markup inside blocks

#[test]
fn test_text_pseudo_element() {
    assert_eq!(render("@if (true) { \n<text>Plain Text</text>\n}"), "Plain Text\n");
}

#[test]
fn test_line_escape() {
    assert_eq!(render("@if (true) { \n@:Plain Text\n}"), "Plain Text\n");
}

#[test]
fn test_markup_spanning_lines() {
    assert_eq!(
        render("@if(true){ \n<span>this is text \nthat spans multiple lines</span> \n}"),
        "<span>this is text \nthat spans multiple lines</span> \n"
    );
}

#[test]
fn test_block_inside_markup_inside_block() {
    let source = concat!(
        "@if(true){ \n",
        "<span>this is text \n",
        "@if(true){ <b>important</b> \n }",
        "that spans multiple lines</span> \n",
        "}"
    );
    assert_eq!(
        render(source),
        "<span>this is text \n<b>important</b> \n that spans multiple lines</span> \n"
    );
}

#[test]
fn test_html_comment_in_block() {
    assert_eq!(
        render("@{ <!-- note --> <p>a</p>\n}"),
        "<!-- note --> <p>a</p>\n"
    );
}

#[test]
fn test_word_else_after_block_is_text() {
    assert_eq!(
        render("@if(true){ <b>x</b> }\nelse is a word"),
        "<b>x</b> \nelse is a word"
    );
}

#[test]
fn test_self_closing_tag_in_block() {
    assert_eq!(render("@if(true) { <img src=\"\" /> \n}"), "<img src=\"\" /> \n");
}

#[test]
fn test_nested_self_closing_tag_in_block() {
    assert_eq!(
        render("@if(true) { <li><img src=\"\" /></li> \n}"),
        "<li><img src=\"\" /></li> \n"
    );
}

// ---------------------------------------------------------------------------
// Options

#[test]
fn test_implicit_scope_disabled() {
    let options = CompileOptions::new().with_implicit_scope(false);
    let template = compile_with_options("<li>@model.name</li>", &options).unwrap();
    assert_eq!(template.render(&json!({ "name": "what" })).unwrap(), "<li>what</li>");
    assert!(!template.procedure().function_source().contains("with"));
}

#[test]
fn test_custom_binding_name() {
    let options = CompileOptions::new()
        .with_binding_name("it")
        .with_implicit_scope(false);
    let template = compile_with_options("<li>@it.name</li>", &options).unwrap();
    assert_eq!(template.render(&json!({ "name": "what" })).unwrap(), "<li>what</li>");
}

#[test]
fn test_options_do_not_leak_between_compiles() {
    let custom = CompileOptions::new()
        .with_binding_name("it")
        .with_implicit_scope(false);
    compile_with_options("@it.name", &custom).unwrap();

    let template = compile("<li>@model.name</li>").unwrap();
    assert_eq!(template.procedure().binding_name, "model");
}

#[test]
fn test_concurrent_renders() {
    let template = std::sync::Arc::new(compile("<p>@n</p>").unwrap());
    let handles: Vec<_> = (0..4)
        .map(|n| {
            let template = std::sync::Arc::clone(&template);
            std::thread::spawn(move || template.render(&json!({ "n": n })).unwrap())
        })
        .collect();
    let outputs: Vec<String> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(
        outputs,
        vec!["<p>0</p>", "<p>1</p>", "<p>2</p>", "<p>3</p>"]
    );
}
