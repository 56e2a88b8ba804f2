//! Runtime behavior code synthesis
//!
//! Turns one behavior descriptor into a self-contained JavaScript
//! block: a constructor initializing the private data record, a
//! hot-patch method for live reload, one accessor pair per property,
//! the event-derived methods and the runtime registration call.
//!
//! Generation is fail-soft: a malformed property type or a missing
//! method name mapping degrades that one item to a clearly marked
//! sentinel in the output and a diagnostic in the result, never the
//! whole batch.

use std::collections::HashMap;

use zephyr_core::{BehaviorDescriptor, Diagnostic, EventMethod, PropertyDescriptor, PropertyType};

use crate::template::substitute;

/// Implementation identifier emitted when the caller-supplied name
/// mapping has no entry for a declared method. Historical shape,
/// preserved verbatim: downstream tooling may parse it.
pub const MISSING_METHOD_SENTINEL: &str = "UNKNOWN_FUNCTION_fix_behaviorMethodMangledNames_please";

/// Literal emitted for a property of unrecognized declared type
pub const UNRECOGNIZED_TYPE_LITERAL: &str = "0 /* Error: property was of an unrecognized type */";

/// Generated source text together with the diagnostics produced while
/// generating it
#[derive(Debug, Clone)]
pub struct GeneratedCode {
    pub code: String,
    pub diagnostics: Vec<Diagnostic>,
}

impl GeneratedCode {
    pub fn clean<S: Into<String>>(code: S) -> Self {
        Self {
            code: code.into(),
            diagnostics: Vec::new(),
        }
    }

    pub fn with_diagnostic<S: Into<String>>(code: S, diagnostic: Diagnostic) -> Self {
        Self {
            code: code.into(),
            diagnostics: vec![diagnostic],
        }
    }

    /// True when generation hit a fail-soft condition
    pub fn is_degraded(&self) -> bool {
        !self.diagnostics.is_empty()
    }
}

const BEHAVIOR_TEMPLATE: &str = r#"
CODE_NAMESPACE = CODE_NAMESPACE || {};

/**
 * Behavior generated from BEHAVIOR_FULL_NAME
 * @class RUNTIME_BEHAVIOR_CLASSNAME
 * @extends zephyr.RuntimeBehavior
 * @constructor
 */
CODE_NAMESPACE.RUNTIME_BEHAVIOR_CLASSNAME = function(runtimeScene, behaviorData, owner)
{
    zephyr.RuntimeBehavior.call(this, runtimeScene, behaviorData, owner);
    this._runtimeScene = runtimeScene;

    this._behaviorData = {};
    INITIALIZE_PROPERTIES_CODE
};

CODE_NAMESPACE.RUNTIME_BEHAVIOR_CLASSNAME.prototype = Object.create( zephyr.RuntimeBehavior.prototype );
zephyr.registerBehavior("EXTENSION_NAME::BEHAVIOR_NAME", CODE_NAMESPACE.RUNTIME_BEHAVIOR_CLASSNAME);

// Hot-reload:
CODE_NAMESPACE.RUNTIME_BEHAVIOR_CLASSNAME.prototype.updateFromBehaviorData = function(oldBehaviorData, newBehaviorData) {
UPDATE_FROM_BEHAVIOR_DATA_CODE

    return true;
}

// Properties:
PROPERTIES_CODE

// Methods:
METHODS_CODE
"#;

const INITIALIZE_FROM_DATA_TEMPLATE: &str = r#"
    this._behaviorData.PROPERTY_NAME = behaviorData.PROPERTY_NAME !== undefined ? behaviorData.PROPERTY_NAME : DEFAULT_VALUE;"#;

const INITIALIZE_FROM_DEFAULT_TEMPLATE: &str = r#"
    this._behaviorData.PROPERTY_NAME = DEFAULT_VALUE;"#;

const PROPERTY_ACCESSORS_TEMPLATE: &str = r#"
CODE_NAMESPACE.RUNTIME_BEHAVIOR_CLASSNAME.prototype.GETTER_NAME = function() {
    return this._behaviorData.PROPERTY_NAME !== undefined ? this._behaviorData.PROPERTY_NAME : DEFAULT_VALUE;
};
CODE_NAMESPACE.RUNTIME_BEHAVIOR_CLASSNAME.prototype.SETTER_NAME = function(newValue) {
    this._behaviorData.PROPERTY_NAME = newValue;
};"#;

const UPDATE_PROPERTY_TEMPLATE: &str = r#"
    if (oldBehaviorData.PROPERTY_NAME !== newBehaviorData.PROPERTY_NAME)
        this._behaviorData.PROPERTY_NAME = newBehaviorData.PROPERTY_NAME;"#;

const METHOD_TEMPLATE: &str = r#"
CODE_NAMESPACE.RUNTIME_BEHAVIOR_CLASSNAME.prototype.FUNCTION_NAME = function() {
METHOD_BODY
};"#;

const ON_DESTROY_COMPATIBILITY_TEMPLATE: &str = r#"
CODE_NAMESPACE.RUNTIME_BEHAVIOR_CLASSNAME.prototype.onDestroy = (function(compiledOnDestroy) {
  // Redirect call to onOwnerRemovedFromScene (the old name of onDestroy),
  // keeping the compiled destruction body.
  return function() {
    if (compiledOnDestroy) compiledOnDestroy.call(this);
    if (this.onOwnerRemovedFromScene) this.onOwnerRemovedFromScene();
  };
})(CODE_NAMESPACE.RUNTIME_BEHAVIOR_CLASSNAME.prototype.onDestroy);"#;

/// Generator for runtime behavior definitions
pub struct BehaviorCodeGenerator;

impl BehaviorCodeGenerator {
    /// Generate the complete definition of one behavior under
    /// `code_namespace`.
    ///
    /// `behavior_method_mangled_names` maps each declared method name
    /// to its implementation identifier. The mapping is supplied by
    /// the caller; this generator never invents implementation names,
    /// and a missing entry degrades that method to
    /// [`MISSING_METHOD_SENTINEL`].
    pub fn generate_runtime_behavior_complete_code(
        extension_name: &str,
        behavior: &BehaviorDescriptor,
        code_namespace: &str,
        behavior_method_mangled_names: &HashMap<String, String>,
    ) -> GeneratedCode {
        let mut diagnostics = Vec::new();

        let mut initialize_code = String::new();
        for property in &behavior.properties {
            let literal = Self::property_literal(property);
            let template = if property.hidden {
                INITIALIZE_FROM_DEFAULT_TEMPLATE
            } else {
                INITIALIZE_FROM_DATA_TEMPLATE
            };
            initialize_code += &substitute(
                template,
                &[
                    ("PROPERTY_NAME", &property.name),
                    ("DEFAULT_VALUE", &literal.code),
                ],
            );
            diagnostics.extend(
                literal
                    .diagnostics
                    .into_iter()
                    .map(|d| d.for_behavior(&behavior.name)),
            );
        }

        let mut update_code = String::new();
        let mut properties_code = String::new();
        for property in &behavior.properties {
            update_code += &substitute(
                UPDATE_PROPERTY_TEMPLATE,
                &[("PROPERTY_NAME", &property.name)],
            );

            let literal = Self::property_literal(property);
            properties_code += &substitute(
                PROPERTY_ACCESSORS_TEMPLATE,
                &[
                    ("PROPERTY_NAME", &property.name),
                    ("GETTER_NAME", &Self::property_getter_name(&property.name)),
                    ("SETTER_NAME", &Self::property_setter_name(&property.name)),
                    ("DEFAULT_VALUE", &literal.code),
                    ("RUNTIME_BEHAVIOR_CLASSNAME", &behavior.name),
                    ("CODE_NAMESPACE", code_namespace),
                ],
            );
        }

        let mut methods_code = String::new();
        for method in &behavior.methods {
            methods_code += &Self::method_code(
                behavior,
                code_namespace,
                method,
                behavior_method_mangled_names,
                &mut diagnostics,
            );
        }

        let code = substitute(
            BEHAVIOR_TEMPLATE,
            &[
                ("EXTENSION_NAME", extension_name),
                ("BEHAVIOR_NAME", &behavior.name),
                ("BEHAVIOR_FULL_NAME", &behavior.full_name),
                ("RUNTIME_BEHAVIOR_CLASSNAME", &behavior.name),
                ("CODE_NAMESPACE", code_namespace),
                ("INITIALIZE_PROPERTIES_CODE", &initialize_code),
                ("UPDATE_FROM_BEHAVIOR_DATA_CODE", &update_code),
                ("PROPERTIES_CODE", &properties_code),
                ("METHODS_CODE", &methods_code),
            ],
        );

        GeneratedCode { code, diagnostics }
    }

    /// Encode a property default value as a JavaScript literal
    /// expression of the declared type.
    pub fn property_literal(property: &PropertyDescriptor) -> GeneratedCode {
        match property.property_type {
            PropertyType::Text | PropertyType::Choice => {
                GeneratedCode::clean(js_string_literal(&property.value))
            }
            // Corrupted stored defaults degrade to 0 at load time.
            PropertyType::Number => GeneratedCode::clean(format!(
                "Number({}) || 0",
                js_string_literal(&property.value)
            )),
            // Exact match on "true"; any other stored text is false.
            PropertyType::Boolean => GeneratedCode::clean(if property.value == "true" {
                "true"
            } else {
                "false"
            }),
            PropertyType::Unknown => GeneratedCode::with_diagnostic(
                UNRECOGNIZED_TYPE_LITERAL,
                Diagnostic::warning("property has an unrecognized declared type")
                    .for_item(&property.name),
            ),
        }
    }

    pub fn property_getter_name(property_name: &str) -> String {
        format!("_get{}", capitalize_first(property_name))
    }

    pub fn property_setter_name(property_name: &str) -> String {
        format!("_set{}", capitalize_first(property_name))
    }

    fn method_code(
        behavior: &BehaviorDescriptor,
        code_namespace: &str,
        method: &EventMethod,
        behavior_method_mangled_names: &HashMap<String, String>,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> String {
        let function_name = match behavior_method_mangled_names.get(&method.name) {
            Some(name) => name.as_str(),
            None => {
                diagnostics.push(
                    Diagnostic::warning("no implementation name mapped for method")
                        .for_behavior(&behavior.name)
                        .for_item(&method.name),
                );
                MISSING_METHOD_SENTINEL
            }
        };

        let mut code = substitute(
            METHOD_TEMPLATE,
            &[
                ("CODE_NAMESPACE", code_namespace),
                ("RUNTIME_BEHAVIOR_CLASSNAME", &behavior.name),
                ("FUNCTION_NAME", function_name),
                ("METHOD_BODY", &method.code),
            ],
        );

        // Compatibility with projects built before the destruction
        // hook was renamed.
        if function_name == "onDestroy" {
            code += &Self::on_destroy_compatibility_code(behavior, code_namespace);
        }
        // end of compatibility code

        code
    }

    fn on_destroy_compatibility_code(
        behavior: &BehaviorDescriptor,
        code_namespace: &str,
    ) -> String {
        substitute(
            ON_DESTROY_COMPATIBILITY_TEMPLATE,
            &[
                ("RUNTIME_BEHAVIOR_CLASSNAME", &behavior.name),
                ("CODE_NAMESPACE", code_namespace),
            ],
        )
    }
}

/// Quote and escape text as a JavaScript string literal
fn js_string_literal(value: &str) -> String {
    let mut literal = String::with_capacity(value.len() + 2);
    literal.push('"');
    for character in value.chars() {
        match character {
            '"' => literal.push_str("\\\""),
            '\\' => literal.push_str("\\\\"),
            '\n' => literal.push_str("\\n"),
            '\r' => literal.push_str("\\r"),
            '\t' => literal.push_str("\\t"),
            // U+2028/U+2029 are line terminators inside JS string
            // literals even though JSON allows them raw.
            '\u{2028}' => literal.push_str("\\u2028"),
            '\u{2029}' => literal.push_str("\\u2029"),
            c if (c as u32) < 0x20 => {
                literal.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => literal.push(c),
        }
    }
    literal.push('"');
    literal
}

fn capitalize_first(name: &str) -> String {
    let mut characters = name.chars();
    match characters.next() {
        Some(first) => first.to_uppercase().collect::<String>() + characters.as_str(),
        None => String::new(),
    }
}
