use super::*;
use crate::references::extract_references;
use pretty_assertions::assert_eq;
use vue_parser::ScriptLang;

fn run(script: &str, fields: &[&str]) -> String {
    let tree = BehaviorTree::parse(script, ScriptLang::JavaScript).unwrap();
    let references = extract_references(&tree);
    let fields: ModelBindings = fields.iter().copied().collect();
    transform_behavior(&tree, &TransformConfig::default(), &references, &fields).unwrap()
}

fn run_err(script: &str) -> TransformError {
    let tree = BehaviorTree::parse(script, ScriptLang::JavaScript).unwrap();
    transform_behavior(&tree, &TransformConfig::default(), &[], &ModelBindings::default())
        .unwrap_err()
}

#[test]
fn test_full_descriptor() {
    let script = r#"import Header from './Header.vue'
import api from './api'

export default {
  components: { Header },
  data() {
    return {
      count: 0
    }
  },
  created() {
    this.count = 1
  },
  methods: {
    inc() {
      this.count += 2
    }
  }
}
"#;

    insta::assert_snapshot!(run(script, &["name"]), @r###"
    import api from './api'

    Page({
      data: {
        count: 0
      },
      onLoad(params) {
        this.setData({ count: 1 })
      },
      inc() {
        this.setData({ count: this.data.count + (2) })
      },
      changeModel_name(event) {
        this.setData({ name: event.detail.value });
      },
      onReachBottom() {},
      onPullDownRefresh() {},
    });
    "###);
}

#[test]
fn test_created_becomes_on_load_with_params() {
    let out = run("export default { created(a) { go(a) } }", &[]);
    assert!(out.contains("onLoad(a, params) { go(a) }"), "{out}");
    assert!(!out.contains("created"));
}

#[test]
fn test_created_function_value() {
    let out = run("export default { created: function () {} }", &[]);
    assert!(out.contains("onLoad: function (params) {}"), "{out}");
}

#[test]
fn test_before_destroy_becomes_on_unload() {
    let out = run("export default { beforeDestroy() { stop() } }", &[]);
    assert!(out.contains("onUnload() { stop() }"), "{out}");
}

#[test]
fn test_existing_hooks_get_no_stubs() {
    let out = run(
        "export default { onReachBottom() { more() }, onPullDownRefresh() { reload() } }",
        &[],
    );
    assert_eq!(out.matches("onReachBottom").count(), 1);
    assert_eq!(out.matches("onPullDownRefresh").count(), 1);
}

#[test]
fn test_missing_hooks_get_stubs() {
    let out = run("export default {}", &[]);
    assert_eq!(
        out,
        "Page({\n  onReachBottom() {},\n  onPullDownRefresh() {},\n});\n"
    );
}

#[test]
fn test_dropped_hooks() {
    let out = run(
        "export default { beforeRouteEnter(to, from, next) { next() }, name: 'a' }",
        &[],
    );
    assert!(!out.contains("beforeRouteEnter"), "{out}");
    assert!(out.contains("name: 'a'"));
}

#[test]
fn test_sections_are_flattened_in_order() {
    let out = run(
        "export default { computed: { total() { return 1 } }, filters: { upper(s) { return s } }, methods: { go() {} } }",
        &[],
    );
    let total = out.find("total()").unwrap();
    let upper = out.find("upper(s)").unwrap();
    let go = out.find("go()").unwrap();
    assert!(total < upper && upper < go, "{out}");
    assert!(!out.contains("computed"));
    assert!(!out.contains("methods"));
    assert!(!out.contains("filters"));
}

#[test]
fn test_data_arrow_and_object_forms() {
    let out = run("export default { data: () => ({ a: 1 }) }", &[]);
    assert!(out.contains("data: { a: 1 }"), "{out}");
    let out = run("export default { data: { b: 2 } }", &[]);
    assert!(out.contains("data: { b: 2 }"), "{out}");
}

#[test]
fn test_data_with_statements_is_an_error() {
    let err = run_err("export default { data() { const a = 1; return { a } } }");
    assert!(matches!(err, TransformError::InvalidData { .. }));
}

#[test]
fn test_methods_must_be_an_object() {
    let err = run_err("export default { methods: makeMethods() }");
    assert!(
        matches!(err, TransformError::InvalidSection { ref section, .. } if section == "methods")
    );
}

#[test]
fn test_missing_default_export_is_an_error() {
    assert!(matches!(
        run_err("const a = 1"),
        TransformError::MissingDefaultExport
    ));
}

#[test]
fn test_assignment_forms() {
    let out = run(
        "export default { methods: { go(k) { this.a = 1; this[k] = 2; this.user.name = 'x'; this.n++; this.m -= 1; other.a = 3 } } }",
        &[],
    );
    assert!(out.contains("this.setData({ a: 1 })"), "{out}");
    assert!(out.contains("this.setData({ [k]: 2 })"), "{out}");
    assert!(out.contains("this.data.user.name = 'x'"), "{out}");
    assert!(out.contains("this.setData({ n: this.data.n + 1 })"), "{out}");
    assert!(out.contains("this.setData({ m: this.data.m - (1) })"), "{out}");
    assert!(out.contains("other.a = 3"), "{out}");
}

#[test]
fn test_chained_assignments_share_one_update() {
    let out = run(
        "export default { created: function () { this.x = this.y = 4; this.total += (this.last = alert(1)) } }",
        &[],
    );
    assert!(out.contains("this.setData({ x: 4, y: 4 })"), "{out}");
    assert!(
        out.contains(
            "this.setData({ total: this.data.total + (wx.showModal({ title: '提示', content: 1, showCancel: false })), \
             last: wx.showModal({ title: '提示', content: 1, showCancel: false }) })"
        ),
        "{out}"
    );
    assert!(!out.contains("setData({ x: this.setData"), "{out}");
}

#[test]
fn test_reads_are_not_routed_through_data() {
    let out = run(
        "export default { methods: { go() { const v = this.a; go(this.b.c); this.d = this.e.f } } }",
        &[],
    );
    assert!(out.contains("const v = this.a;"), "{out}");
    assert!(out.contains("go(this.b.c);"), "{out}");
    assert!(out.contains("this.setData({ d: this.e.f })"), "{out}");
    assert!(!out.contains("this.data."), "{out}");
}

#[test]
fn test_nested_rewrite_inside_assignment() {
    let out = run(
        "export default { methods: { go() { this.msg = confirmText(alert('hi')) } } }",
        &[],
    );
    assert!(
        out.contains("this.setData({ msg: confirmText(wx.showModal({ title: '提示', content: 'hi', showCancel: false })) })"),
        "{out}"
    );
}

#[test]
fn test_alert_outside_descriptor() {
    let out = run("function warn(m) { alert(m) }\nexport default {}", &[]);
    assert!(
        out.starts_with("function warn(m) { wx.showModal({ title: '提示', content: m, showCancel: false }) }"),
        "{out}"
    );
}

#[test]
fn test_router_calls_are_substituted() {
    let out = run(
        "export default { methods: { back() { this.$router.go(-1) } } }",
        &[],
    );
    assert!(out.contains("utils.navigator.go(-1)"), "{out}");
}

#[test]
fn test_model_handler_per_field() {
    let out = run("export default {}", &["username", "form.email", "username"]);
    assert_eq!(out.matches("changeModel_username(event)").count(), 1);
    assert!(out.contains(
        "changeModel_form_email(event) {\n    this.setData({ 'form.email': event.detail.value });\n  }"
    ));
}

#[test]
fn test_unregistered_imports_are_kept() {
    let out = run(
        "import Header from './Header.vue';\nimport Footer from './Footer.vue';\nexport default { components: { Header } }",
        &[],
    );
    assert!(!out.contains("Header"), "{out}");
    assert!(out.starts_with("import Footer from './Footer.vue';\n"), "{out}");
}
