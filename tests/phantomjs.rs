//! Runs against a real PhantomJS; every test returns early when it is missing.

use std::process::Command;
use std::time::{Duration, Instant};

use phandom_lib::{DriverScript, Page, Phandom, PhandomError, DEFAULT_RENDERER};

fn installed() -> bool {
    let installed = Phandom::is_installed_blocking();
    if !installed {
        eprintln!("phantomjs is not installed, skipping");
    }
    installed
}

#[test]
fn builds_dom_document() {
    if !installed() {
        return;
    }
    let html = concat!(
        "<!DOCTYPE html>\n",
        "<html><head>\n",
        "<meta content='hi there' name='description'/>\n",
        "</head><body><p>&euro;</p><a href='#'/></body></html>"
    );

    let dom = Phandom::new(Page::text(html)).dom_blocking().unwrap();

    assert!(dom
        .select("/html/head/meta")
        .iter()
        .any(|m| m.attr("name") == Some("description")));
    assert!(dom.select("//p").iter().any(|p| p.text() == "\u{20ac}"));
}

#[test]
fn repairs_broken_markup() {
    if !installed() {
        return;
    }

    let dom = Phandom::new(Page::text("<html>\nbroken")).dom_blocking().unwrap();

    assert_eq!(dom.count("/html/head"), 1);
    assert_eq!(dom.count("/html/body"), 1);
}

#[test]
fn fails_on_script_errors() {
    if !installed() {
        return;
    }
    let html = "<html><body><script>a.call();</script>\n</body></html>";

    let err = Phandom::new(Page::text(html)).dom_blocking().unwrap_err();

    assert!(
        matches!(err, PhandomError::RendererFailed { code: Some(3), .. }),
        "got {err:?}"
    );
}

#[test]
fn scripts_run_before_serialization() {
    if !installed() {
        return;
    }
    let mut html = String::from(
        "<html><body><script>//<![CDATA[\n\
         for (var i = 0; i < 1000; i++) { var d = document.createElement('div');\
         d.innerHTML = i + '&lt;<b>&gt;</b>&amp;'; document.body.appendChild(d); }\n\
         var divs = document.querySelectorAll('div');\
         for (var j = 0; j < divs.length; j++) { divs[j].parentNode.removeChild(divs[j]); }\n\
         //]]></script>",
    );
    html.push_str("</body></html>");

    let dom = Phandom::new(Page::text(html)).dom_blocking().unwrap();

    assert_eq!(dom.count("/html/body"), 1);
    assert_eq!(dom.count("//div"), 0);
}

#[test]
fn onload_handlers_finish_before_serialization() {
    if !installed() {
        return;
    }
    let html = concat!(
        "<html><head><script>//<![CDATA[\n",
        "function fill() {\n",
        "  for (var i = 0; i < 1000; i++) {\n",
        "    var d = document.createElement('div');\n",
        "    d.innerHTML = i + '&lt;<b>&gt;</b>&amp;';\n",
        "    document.body.appendChild(d);\n",
        "  }\n",
        "  var divs = document.querySelectorAll('div');\n",
        "  for (var j = 0; j < divs.length; j++) {\n",
        "    divs[j].parentNode.removeChild(divs[j]);\n",
        "  }\n",
        "  document.body.setAttribute('data-filled', 'yes');\n",
        "}\n",
        "//]]></script></head><body onload='fill()'></body></html>"
    );

    let dom = Phandom::new(Page::text(html)).dom_blocking().unwrap();

    let body = dom.select_first("/html/body").unwrap();
    assert_eq!(body.attr("data-filled"), Some("yes"));
    assert_eq!(dom.count("/html/body/div"), 0);
}

#[test]
fn bundled_driver_exits_with_usage_code_without_uri() {
    if !installed() {
        return;
    }
    let dir = tempfile::TempDir::new().unwrap();
    let script = dir.path().join("dom.js");
    std::fs::write(&script, DriverScript::Bundled.source()).unwrap();

    let start = Instant::now();
    let output = Command::new(DEFAULT_RENDERER)
        .arg(&script)
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(2));
    assert!(output.stdout.is_empty());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Usage"));
    assert!(start.elapsed() < Duration::from_secs(30));
}

#[test]
fn renders_local_files() {
    if !installed() {
        return;
    }
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("a.html");
    std::fs::write(&path, "<html><p>hi!</p></html>").unwrap();

    let dom = Phandom::new(Page::file(&path).unwrap()).dom_blocking().unwrap();

    assert!(dom.select("//body/p").iter().any(|p| p.text() == "hi!"));
}

#[test]
fn renders_markup_deterministically() {
    if !installed() {
        return;
    }
    let phandom = Phandom::new(Page::text("<html><body><ul><li>x</li></ul></body></html>"));

    assert_eq!(phandom.dom_blocking().unwrap(), phandom.dom_blocking().unwrap());
}

#[test]
#[ignore = "needs network access"]
fn renders_web_pages() {
    if !installed() {
        return;
    }
    let page = Page::parse_uri("http://www.xembly.org/index.html").unwrap();

    let dom = Phandom::new(page).dom_blocking().unwrap();

    assert_eq!(dom.count("/html/head"), 1);
}
