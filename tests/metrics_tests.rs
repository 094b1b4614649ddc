//! Coupling and CodeRank analysis through the engine

mod common;

use common::Fixture;
use depend::ast::{Expr, Scope, TypeRef};
use depend::metrics::{
    Analyzer, AnalyzerState, CodeRankAnalyzer, CodeRankSettings, CouplingAnalyzer, Engine,
    MetricValue, NodeCoupling, NullListener,
};

#[test]
fn supertypes_are_not_coupled_but_unrelated_types_are() {
    let mut f = Fixture::new("app");
    let x = f.class("X");
    let y = f.class("Y");
    let d = f.class("D");
    f.extends(d, "app\\X");
    let m = f.method(d, "m");
    f.model.routine_mut(m).unwrap().return_type = Some(TypeRef::new("app\\X"));
    let n = f.method(d, "n");
    f.model.routine_mut(n).unwrap().thrown.push(TypeRef::new("app\\Y"));

    let mut coupling = CouplingAnalyzer::new();
    coupling
        .analyze(Scope::unfiltered(&f.model), f.model.namespaces(), &mut NullListener)
        .unwrap();

    assert_eq!(coupling.coupling(d), Some(NodeCoupling { ca: 0, cbo: 1, ce: 1 }));
    assert_eq!(coupling.coupling(y).unwrap().ca, 1);
    assert_eq!(coupling.coupling(x).unwrap().ca, 0);
}

#[test]
fn repeated_calls_count_once_per_routine() {
    let mut f = Fixture::new("app");
    let service = f.class("Service");
    let run = f.method(service, "run");
    let call = || {
        Expr::member(
            "->",
            Expr::variable("$this"),
            Expr::member("->", Expr::variable("logger"), Expr::invocation("info", vec![])),
        )
    };
    f.model.routine_mut(run).unwrap().body = vec![call(), call()];

    let mut coupling = CouplingAnalyzer::new();
    coupling
        .analyze(Scope::unfiltered(&f.model), f.model.namespaces(), &mut NullListener)
        .unwrap();
    assert_eq!(coupling.calls(), 1);
}

#[test]
fn lone_node_ranks_one_minus_damping() {
    let mut f = Fixture::new("app");
    let alone = f.class("Alone");

    for (damping, iterations) in [(0.85, 1), (0.85, 50), (0.5, 3)] {
        let settings = CodeRankSettings {
            damping,
            iterations,
            ..CodeRankSettings::default()
        };
        let mut coderank = CodeRankAnalyzer::new(&settings).unwrap();
        coderank
            .analyze(Scope::unfiltered(&f.model), f.model.namespaces(), &mut NullListener)
            .unwrap();
        let rank = coderank.rank(alone).unwrap();
        assert!((rank.cr - (1.0 - damping)).abs() < 1e-9);
    }
}

#[test]
fn engine_report_combines_both_analyzers() {
    let mut f = Fixture::new("app");
    let model_base = f.class("Model");
    let user = f.class("User");
    let mailer = f.class("Mailer");
    f.extends(user, "app\\Model");
    let notify = f.method(user, "notify");
    f.model.routine_mut(notify).unwrap().body = vec![Expr::allocation("app\\Mailer", vec![])];

    let mut engine = Engine::new();
    engine.add_analyzer(Box::new(CouplingAnalyzer::new()));
    engine.add_analyzer(Box::new(CodeRankAnalyzer::default()));
    let report = engine.analyze(&f.model).unwrap();

    let user_node = report.node_named("app\\User").unwrap();
    assert_eq!(user_node.id, user);
    assert_eq!(user_node.metrics["ce"], MetricValue::Int(1));
    assert_eq!(user_node.metrics["in"], MetricValue::Int(1));
    assert_eq!(report.node(mailer).unwrap().metrics["ca"], MetricValue::Int(1));
    assert_eq!(report.node(model_base).unwrap().metrics["out"], MetricValue::Int(1));
    assert_eq!(
        report.project["coupling"]["fanout"],
        MetricValue::Int(1)
    );

    let json = serde_json::to_string(&report).unwrap();
    assert!(json.contains("\"app\\\\User\""));
    assert!(engine
        .analyzers()
        .all(|a| a.state() == AnalyzerState::Finalized));
}

#[test]
fn engine_rejects_bodies_nested_past_the_limit() {
    let mut f = Fixture::new("app");
    f.class("Mailer");
    let user = f.class("User");
    let notify = f.method(user, "notify");
    let body = (0..50).fold(Expr::allocation("app\\Mailer", vec![]), |expr, _| {
        Expr::compound("block", vec![expr])
    });
    f.model.routine_mut(notify).unwrap().body = vec![body];

    let mut engine = Engine::new();
    engine.add_analyzer(Box::new(CouplingAnalyzer::new()));
    engine.set_max_nesting(10);

    assert!(engine.analyze(&f.model).is_err());
    let coupling = engine.analyzer("coupling").unwrap();
    assert_eq!(coupling.state(), AnalyzerState::Uninitialized);
    assert!(coupling.node_metrics(user).is_empty());

    engine.set_max_nesting(64);
    let report = engine.analyze(&f.model).unwrap();
    assert_eq!(report.node(user).unwrap().metrics["ce"], MetricValue::Int(1));
}
