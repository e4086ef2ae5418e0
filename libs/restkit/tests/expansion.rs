//! Descriptor building and request expansion through the registry.

use http::Method;
use restkit::{
    BindingKind, ContractCatalog, ContractDef, CookieTag, EndpointRegistry, Error, ExpansionError,
    HeaderTag, MapBinding, NamedBinding, OperationDef, ParameterDef, ParameterTag, Tag,
    TemplateError,
};
use serde_json::{Value, json};

fn registry(contracts: impl IntoIterator<Item = ContractDef>) -> EndpointRegistry {
    let mut catalog = ContractCatalog::new();
    for contract in contracts {
        catalog.register(contract).unwrap();
    }
    EndpointRegistry::builder(catalog)
        .endpoint("http://my.api.com")
        .build()
}

fn header<'a>(request: &'a restkit::EndpointRequest, name: &str) -> Vec<&'a str> {
    request
        .headers()
        .get_all(name)
        .iter()
        .map(|value| value.to_str().unwrap())
        .collect()
}

#[test]
fn test_simple_get_end_to_end() {
    let registry = registry([ContractDef::new("UserApi").operation(
        OperationDef::get("find", "/{id}").param(ParameterDef::new("id", "String")),
    )]);

    let request = registry.request("UserApi", "find", &[json!(42)]).unwrap();
    assert_eq!(request.method(), &Method::GET);
    assert_eq!(request.path(), "http://my.api.com/42");
    assert_eq!(request.query(), "");
    assert!(request.headers().is_empty());
    assert_eq!(request.uri(), "http://my.api.com/42");
}

#[test]
fn test_null_query_arguments_are_omitted() {
    let registry = registry([ContractDef::new("Search").operation(
        OperationDef::get("search", "/search")
            .param(ParameterDef::new("param1", "String").tag(ParameterTag::Query(NamedBinding::default())))
            .param(ParameterDef::new("param2", "String").tag(ParameterTag::Query(NamedBinding::default()))),
    )]);
    let descriptor = registry.descriptor("Search", "search").unwrap();

    let request = descriptor.expand(&[json!("v1"), Value::Null]).unwrap();
    assert_eq!(request.query(), "?param1=v1");
    assert_eq!(request.uri(), "http://my.api.com/search?param1=v1");

    let resolver = restkit::expand::QueryParameterResolver::new(&descriptor);
    assert_eq!(resolver.resolve(&[json!("v1"), Value::Null]), "?param1=v1");
    assert_eq!(resolver.resolve(&[Value::Null, Value::Null]), "");

    let request = descriptor.expand(&[Value::Null, Value::Null]).unwrap();
    assert_eq!(request.query(), "");
    assert_eq!(request.uri(), "http://my.api.com/search");
}

#[test]
fn test_query_values_are_encoded_and_arrays_repeated() {
    let registry = registry([ContractDef::new("Search").operation(
        OperationDef::get("search", "/search")
            .param(ParameterDef::new("q", "String").tag(ParameterTag::Query(NamedBinding::default())))
            .param(
                ParameterDef::new("tags", "List<String>")
                    .tag(ParameterTag::Query(NamedBinding::named("tag"))),
            ),
    )]);
    let request = registry
        .request("Search", "search", &[json!("a&b c"), json!(["x", "y"])])
        .unwrap();
    assert_eq!(request.query(), "?q=a%26b%20c&tag=x&tag=y");
}

#[test]
fn test_query_map_expands_object_entries() {
    let registry = registry([ContractDef::new("Search").operation(
        OperationDef::get("filter", "/items?fixed=1")
            .param(ParameterDef::new("filters", "Map").tag(ParameterTag::QueryMap(MapBinding::default()))),
    )]);
    let request = registry
        .request(
            "Search",
            "filter",
            &[json!({"status": "open", "owner": null, "page": 2})],
        )
        .unwrap();
    assert_eq!(request.query(), "?page=2&status=open");
    assert_eq!(request.uri(), "http://my.api.com/items?fixed=1&page=2&status=open");
}

#[test]
fn test_path_template_operators_expand_path_bindings() {
    let registry = registry([ContractDef::new("Files").operation(
        OperationDef::get("read", "/files{/dir}/{+file}{#section}")
            .param(ParameterDef::new("dir", "String"))
            .param(ParameterDef::new("file", "String"))
            .param(ParameterDef::new("section", "String")),
    )]);
    let request = registry
        .request("Files", "read", &[json!("docs"), json!("a/b.txt"), json!("intro")])
        .unwrap();
    assert_eq!(request.path(), "http://my.api.com/files/docs/a/b.txt#intro");
}

#[test]
fn test_path_variables_without_path_binding_expand_to_empty() {
    let registry = registry([ContractDef::new("Api").operation(
        OperationDef::get("op", "/a/{missing}/{id}/{token}/{q}")
            .param(ParameterDef::new("id", "String"))
            .param(ParameterDef::new("q", "String").tag(ParameterTag::Query(NamedBinding::default())))
            .param(ParameterDef::new("token", "String").tag(ParameterTag::Header(NamedBinding::default()))),
    )]);

    let request = registry
        .request("Api", "op", &[json!("7"), json!("x"), json!("t")])
        .unwrap();
    assert_eq!(request.path(), "http://my.api.com/a//7//");
    assert_eq!(request.query(), "?q=x");
    assert_eq!(header(&request, "token"), ["t"]);

    let descriptor = registry.descriptor("Api", "op").unwrap();
    let resolver = restkit::expand::PathParameterResolver::new(&descriptor);
    assert_eq!(
        resolver.resolve(&[json!("7"), Value::Null, Value::Null]).unwrap(),
        "http://my.api.com/a//7//"
    );
}

#[test]
fn test_null_path_argument_fails() {
    let registry = registry([ContractDef::new("UserApi").operation(
        OperationDef::get("find", "/{id}").param(ParameterDef::new("id", "String")),
    )]);
    let err = registry.request("UserApi", "find", &[Value::Null]).unwrap_err();
    assert!(matches!(
        err,
        Error::Expansion(ExpansionError::MissingPathArgument { ref name, position: 0, .. }) if name == "id"
    ));
}

#[test]
fn test_argument_count_must_match() {
    let registry = registry([ContractDef::new("UserApi").operation(
        OperationDef::get("find", "/{id}").param(ParameterDef::new("id", "String")),
    )]);
    let err = registry.request("UserApi", "find", &[]).unwrap_err();
    assert!(matches!(
        err,
        Error::Expansion(ExpansionError::ArgumentCount {
            expected: 1,
            actual: 0,
            ..
        })
    ));
}

#[test]
fn test_unsupported_operator_fails_at_expansion() {
    let registry = registry([ContractDef::new("Api").operation(
        OperationDef::get("op", "/things{;id}").param(ParameterDef::new("id", "String")),
    )]);
    // building succeeds, the template is only parsed when expanded
    let descriptor = registry.descriptor("Api", "op").unwrap();
    let err = descriptor.expand(&[json!(1)]).unwrap_err();
    assert!(matches!(
        err,
        ExpansionError::Template(TemplateError::UnsupportedOperator { operator: ';', .. })
    ));
}

#[test]
fn test_header_templates_and_unreferenced_header_bindings() {
    let registry = registry([ContractDef::new("Api")
        .tag(Tag::Header(HeaderTag::new("Accept", "application/json")))
        .operation(
            OperationDef::get("op", "/op")
                .tag(Tag::Header(HeaderTag::new("Authorization", "{token}")))
                .tag(Tag::Header(HeaderTag::new("X-Static", "{not-a-param}")))
                .param(ParameterDef::new("token", "String").tag(ParameterTag::Header(NamedBinding::default())))
                .param(
                    ParameterDef::new("trace", "String")
                        .tag(ParameterTag::Header(NamedBinding::named("X-Trace-Id"))),
                ),
        )]);

    let request = registry
        .request("Api", "op", &[json!("Bearer abc"), json!("t-1")])
        .unwrap();
    assert_eq!(header(&request, "accept"), ["application/json"]);
    assert_eq!(header(&request, "authorization"), ["Bearer abc"]);
    assert_eq!(header(&request, "x-static"), ["{not-a-param}"]);
    assert_eq!(header(&request, "x-trace-id"), ["t-1"]);

    let request = registry.request("Api", "op", &[Value::Null, Value::Null]).unwrap();
    assert_eq!(header(&request, "authorization"), [""]);
    assert!(header(&request, "x-trace-id").is_empty());
}

#[test]
fn test_invalid_header_value_fails_at_expansion() {
    let registry = registry([ContractDef::new("Api").operation(
        OperationDef::get("op", "/op")
            .param(ParameterDef::new("X-Note", "String").tag(ParameterTag::Header(NamedBinding::default()))),
    )]);
    let err = registry.request("Api", "op", &[json!("line\nbreak")]).unwrap_err();
    assert!(matches!(
        err,
        Error::Expansion(ExpansionError::InvalidHeaderValue { ref name, .. }) if name == "X-Note"
    ));
}

#[test]
fn test_cookies_merge_into_one_header() {
    let registry = registry([ContractDef::new("Api")
        .tag(Tag::Cookie(CookieTag::new("theme", "dark")))
        .operation(
            OperationDef::get("op", "/op")
                .param(ParameterDef::new("session", "String").tag(ParameterTag::Cookie(NamedBinding::default())))
                .param(ParameterDef::new("lang", "String").tag(ParameterTag::Cookie(NamedBinding::default()))),
        )]);

    let request = registry
        .request("Api", "op", &[json!("s1"), Value::Null])
        .unwrap();
    assert_eq!(header(&request, "cookie"), ["theme=dark; session=s1"]);
}

#[test]
fn test_body_passes_through_and_callbacks_are_ignored() {
    let registry = registry([ContractDef::new("Api").operation(
        OperationDef::post("create", "/users")
            .param(ParameterDef::new("user", "User").tag(ParameterTag::Body))
            .param(ParameterDef::new("done", "Callback<User>").tag(ParameterTag::Callback)),
    )]);
    let descriptor = registry.descriptor("Api", "create").unwrap();
    assert!(descriptor.is_runnable_async());
    assert_eq!(descriptor.bindings(BindingKind::Body).count(), 1);

    let user = json!({"name": "Ada"});
    let request = descriptor.expand(&[user.clone(), json!("ignored")]).unwrap();
    assert_eq!(request.method(), &Method::POST);
    assert_eq!(request.body(), Some(&user));
    assert_eq!(request.path(), "http://my.api.com/users");
}

#[test]
fn test_expansion_is_repeatable() {
    let registry = registry([ContractDef::new("UserApi").operation(
        OperationDef::get("find", "/{id}")
            .param(ParameterDef::new("id", "String"))
            .param(ParameterDef::new("q", "String").tag(ParameterTag::Query(NamedBinding::default()))),
    )]);
    let descriptor = registry.descriptor("UserApi", "find").unwrap();
    let args = [json!(7), json!("x")];
    let first = descriptor.expand(&args).unwrap().uri();
    for _ in 0..5 {
        assert_eq!(descriptor.expand(&args).unwrap().uri(), first);
    }
}

#[test]
fn test_custom_serializer_registered_on_builder() {
    struct Upper;

    impl restkit::ParameterSerializer for Upper {
        fn name(&self) -> &str {
            "upper"
        }

        fn supports(&self, kind: BindingKind) -> bool {
            kind == BindingKind::Path
        }

        fn serialize(&self, _name: &str, value: &Value) -> String {
            restkit::serializer::value_to_string(value).to_uppercase()
        }
    }

    let catalog = ContractCatalog::new()
        .with(ContractDef::new("Api").operation(
            OperationDef::get("op", "/codes/{code}").param(
                ParameterDef::new("code", "String")
                    .tag(ParameterTag::Path(NamedBinding::default().serializer("upper"))),
            ),
        ))
        .unwrap();
    let registry = EndpointRegistry::builder(catalog)
        .serializer(std::sync::Arc::new(Upper))
        .build();

    let request = registry.request("Api", "op", &[json!("abc")]).unwrap();
    assert_eq!(request.path(), "/codes/ABC");
}
