//! Language adapter integration tests against the fixture trees.

mod common;

use common::*;
use pretty_assertions::assert_eq;

// ===========================================================================
// Java
// ===========================================================================

#[test]
fn java_package_imports_and_stereotypes() {
    let ns = parse_fixture_file("java", "java_simple", "com/acme/billing/Invoice.java");
    assert_eq!(ns.name, "com.acme.billing");
    assert_eq!(
        imports(&ns),
        vec!["com.acme.payments.Gateway", "java.util.ArrayList", "java.util.List"]
    );
    let invoice = ns.get_class("Invoice").unwrap();
    assert_eq!(invoice.stereotypes, vec!["Entity"]);
    assert_eq!(invoice.file_path.as_deref(), Some("com/acme/billing/Invoice.java"));
}

#[test]
fn java_fields_methods_and_calls() {
    let ns = parse_fixture_file("java", "java_simple", "com/acme/billing/Invoice.java");
    let invoice = ns.get_class("Invoice").unwrap();

    assert_eq!(attribute_pairs(invoice), vec![("total", "long"), ("items", "List<LineItem>")]);
    assert_eq!(method_names(invoice), vec!["Invoice", "pay", "load"]);

    let pay = method(invoice, "pay");
    assert_eq!(parameter_pairs(pay), vec![("gateway", "Gateway")]);
    assert_eq!(
        pay.invoked_methods,
        vec!["Gateway.charge", "LineItem.constructor", "helper.run", "items.add"]
    );
    assert_eq!(method(invoice, "load").invoked_methods, vec!["Invoice.constructor"]);
}

#[test]
fn java_record_components_are_attributes() {
    let ns = parse_fixture_file("java", "java_simple", "com/acme/billing/LineItem.java");
    let item = ns.get_class("LineItem").unwrap();
    assert_eq!(attribute_pairs(item), vec![("label", "String"), ("quantity", "int")]);
    assert_eq!(method_names(item), vec!["weight"]);
}

#[test]
fn java_varargs_and_receiver_chains() {
    let ns = parse_fixture_file("java", "java_simple", "com/acme/payments/Gateway.java");
    let gateway = ns.get_class("Gateway").unwrap();
    assert_eq!(gateway.stereotypes, vec!["Service"]);

    let audit = method(gateway, "audit");
    assert_eq!(parameter_pairs(audit), vec![("action", "String"), ("amounts", "long...")]);
    assert_eq!(audit.invoked_methods, vec!["System.out.println"]);
    assert_eq!(method(gateway, "charge").invoked_methods, vec!["audit"]);
}

#[test]
fn java_interface_with_nested_enum() {
    let ns = parse_fixture_file("java", "java_simple", "com/acme/reports/Report.java");
    let report = ns.get_class("Report").unwrap();
    assert_eq!(method_names(report), vec!["render"]);
    assert_eq!(parameter_pairs(&report.methods[0]), vec![("invoice", "Invoice")]);
    assert!(ns.get_class("Format").is_some());
}

#[test]
fn java_chained_call_keeps_bare_member() {
    let ns = parse_fixture_file("java", "java_simple", "com/acme/util/Strings.java");
    let strings = ns.get_class("Strings").unwrap();
    assert!(strings.stereotypes.is_empty());
    assert_eq!(attribute_pairs(strings), vec![("EMPTY", "String")]);
    assert_eq!(method(strings, "isBlank").invoked_methods, vec!["isEmpty", "value.trim"]);
}

// ===========================================================================
// Kotlin
// ===========================================================================

#[test]
fn kotlin_data_class_constructor_properties() {
    let ns = parse_fixture_file("kotlin", "kotlin_simple", "orders/Order.kt");
    assert_eq!(ns.name, "com.shop.orders");
    assert_eq!(imports(&ns), vec!["com.shop.customers.Customer"]);

    let order = ns.get_class("Order").unwrap();
    assert_eq!(order.stereotypes, vec!["data"]);
    // `note` has no val/var and is only a constructor argument.
    assert_eq!(attribute_pairs(order), vec![("id", "Long"), ("customer", "Customer")]);
    assert_eq!(
        method(order, "total").invoked_methods,
        vec!["Customer.constructor", "customer.discount"]
    );
}

#[test]
fn kotlin_companion_members_fold_into_class() {
    let ns = parse_fixture_file("kotlin", "kotlin_simple", "customers/Customer.kt");
    let customer = ns.get_class("Customer").unwrap();

    assert_eq!(attribute_pairs(customer), vec![("id", "Long"), ("orders", "MutableList<Order>")]);
    assert_eq!(method_names(customer), vec!["discount", "place", "guest"]);
    assert_eq!(parameter_pairs(method(customer, "place")), vec![("order", "Order")]);
    assert_eq!(method(customer, "place").invoked_methods, vec!["orders.add"]);
    assert_eq!(method(customer, "guest").invoked_methods, vec!["Customer.constructor"]);
}

#[test]
fn kotlin_object_declaration_is_a_class() {
    let ns = parse_fixture_file("kotlin", "kotlin_simple", "audit/AuditLog.kt");
    let log = ns.get_class("AuditLog").unwrap();
    assert_eq!(method_names(log), vec!["record"]);
    assert_eq!(parameter_pairs(&log.methods[0]), vec![("message", "String")]);
}

// ===========================================================================
// PHP
// ===========================================================================

#[test]
fn php_namespace_and_use_clauses_are_dotted() {
    let ns = parse_fixture_file("php", "php_simple", "src/Billing/Checkout.php");
    assert_eq!(ns.name, "App.Billing");
    assert_eq!(imports(&ns), vec!["App.Payments.Gateway", "App.Support.Logger"]);
}

#[test]
fn php_attributes_modifiers_and_promoted_properties() {
    let ns = parse_fixture_file("php", "php_simple", "src/Billing/Checkout.php");
    let checkout = ns.get_class("Checkout").unwrap();

    assert!(checkout.stereotypes.contains(&"Service".to_string()));
    assert!(checkout.stereotypes.contains(&"final".to_string()));
    assert_eq!(attribute_pairs(checkout), vec![("total", "int"), ("gateway", "Gateway")]);
    assert_eq!(method_names(checkout), vec!["__construct", "charge"]);

    let charge = method(checkout, "charge");
    assert_eq!(parameter_pairs(charge), vec![("amount", "int")]);
    assert!(charge.invoked_methods.contains(&"Gateway::audit".to_string()));
    assert!(charge.invoked_methods.contains(&"Logger::info".to_string()));
}

#[test]
fn php_interface_and_trait() {
    let gateway = parse_fixture_file("php", "php_simple", "src/Payments/Gateway.php");
    assert_eq!(method_names(gateway.get_class("Gateway").unwrap()), vec!["pay"]);

    let auditing = parse_fixture_file("php", "php_simple", "src/Payments/Auditing.php");
    let audit = method(auditing.get_class("Auditing").unwrap(), "audit");
    assert_eq!(parameter_pairs(audit), vec![("amounts", "int")]);
    assert_eq!(audit.invoked_methods, vec!["self::log"]);
}

// ===========================================================================
// Python
// ===========================================================================

#[test]
fn python_namespace_is_module_path() {
    let ns = parse_fixture_file("python", "python_simple", "app/models.py");
    assert_eq!(ns.name, "app.models");
    let package = parse_fixture_file("python", "python_simple", "app/__init__.py");
    assert_eq!(package.name, "app");
    assert!(package.classes.is_empty());
}

#[test]
fn python_dataclass_fields_and_decorators() {
    let ns = parse_fixture_file("python", "python_simple", "app/models.py");
    assert_eq!(imports(&ns), vec!["dataclasses.dataclass"]);

    let user = ns.get_class("User").unwrap();
    assert_eq!(user.stereotypes, vec!["dataclass"]);
    assert_eq!(attribute_pairs(user), vec![("name", "str"), ("email", "str")]);
    assert_eq!(method(user, "display").invoked_methods, vec!["self.name.title"]);
}

#[test]
fn python_imports_methods_and_self_attributes() {
    let ns = parse_fixture_file("python", "python_simple", "app/services.py");
    assert_eq!(
        imports(&ns),
        vec!["app.models.User", "app.repository.Repository", "logging"]
    );

    let service = ns.get_class("UserService").unwrap();
    assert_eq!(attribute_pairs(service), vec![("repo", ""), ("limit", "")]);
    assert_eq!(method_names(service), vec!["__init__", "register"]);
    assert_eq!(parameter_pairs(method(service, "__init__")), vec![("repo", "Repo"), ("limit", "")]);

    let register = method(service, "register");
    assert_eq!(parameter_pairs(register), vec![("name", "str"), ("email", "str")]);
    assert_eq!(register.invoked_methods, vec!["User", "logging.info", "self.repo.save"]);
}
