//! End-to-end dispatch through the standard registry with an in-memory host.

use dicer_expr::{Roller, SequenceRoller};
use dicer_rules::{
    AbilityBucket, CommandInput, CommandRegistry, DispatchOutcome, ExecProp, MemoryCpi,
    RoleAbility, RulesConfig, UserRole, get_role_ability_int, get_role_ability_value,
};

const ACTOR: i64 = 1;
const OTHER: i64 = 2;

fn registry() -> CommandRegistry {
    CommandRegistry::standard(&RulesConfig::default()).unwrap()
}

fn actor() -> ExecProp {
    ExecProp::new(UserRole::new(ACTOR, "调查员"))
}

fn other() -> UserRole {
    UserRole::new(OTHER, "对手")
}

async fn run(
    cpi: &MemoryCpi,
    namespace: &str,
    line: &str,
    mentioned: Vec<UserRole>,
    roller: &mut dyn Roller,
) -> DispatchOutcome {
    registry()
        .dispatch_line(namespace, line, mentioned, cpi, &actor(), roller)
        .await
}

#[tokio::test]
async fn skill_check_missing_attribute_reports_and_fails() {
    let cpi = MemoryCpi::new().with_role(ACTOR, RoleAbility::default());
    let mut roller = SequenceRoller::constant(50);
    let outcome = run(&cpi, "coc7", ".rc 力量", vec![], &mut roller).await;
    assert_eq!(outcome, DispatchOutcome::Handled(false));
    let messages = cpi.messages();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains("未找到技能或属性"));
    assert_eq!(roller.rolls(), 0);
}

#[tokio::test]
async fn skill_check_with_explicit_value_needs_no_record() {
    let cpi = MemoryCpi::new();
    let mut roller = SequenceRoller::new(vec![40]);
    let outcome = run(&cpi, "coc7", ".rc 力量 60", vec![], &mut roller).await;
    assert_eq!(outcome, DispatchOutcome::Handled(true));
    assert_eq!(cpi.messages(), vec!["调查员进行力量检定：D100=40/60 成功"]);
}

#[tokio::test]
async fn skill_check_reads_store_and_aliases() {
    let cpi = MemoryCpi::new().with_role(
        ACTOR,
        RoleAbility::default().with(AbilityBucket::Ability, "力量", 60),
    );
    let mut roller = SequenceRoller::new(vec![5]);
    let outcome = run(&cpi, "coc7", ".ra STR", vec![], &mut roller).await;
    assert_eq!(outcome, DispatchOutcome::Handled(true));
    assert!(cpi.messages()[0].ends_with("D100=5/60 大成功"));
}

#[tokio::test]
async fn glued_skill_check() {
    let cpi = MemoryCpi::new();
    let mut roller = SequenceRoller::new(vec![97]);
    let outcome = run(&cpi, "coc7", ".rc侦查50", vec![], &mut roller).await;
    assert_eq!(outcome, DispatchOutcome::Handled(true));
    assert_eq!(cpi.messages(), vec!["调查员进行侦查检定：D100=97/50 大失败"]);
}

#[tokio::test]
async fn hidden_check_goes_to_toast() {
    let cpi = MemoryCpi::new();
    let mut roller = SequenceRoller::new(vec![20]);
    run(&cpi, "coc7", ".rc h 聆听 60", vec![], &mut roller).await;
    assert_eq!(cpi.toasts(), vec!["调查员进行聆听检定：D100=20/60 困难成功"]);
    assert_eq!(cpi.messages(), vec!["调查员进行了一次暗骰"]);
}

#[tokio::test]
async fn missing_skill_name() {
    let cpi = MemoryCpi::new();
    let mut roller = SequenceRoller::constant(1);
    let outcome = run(&cpi, "coc7", ".rc", vec![], &mut roller).await;
    assert_eq!(outcome, DispatchOutcome::Handled(false));
    assert_eq!(cpi.messages(), vec!["错误：缺少技能名称"]);
}

#[tokio::test]
async fn sanity_check_persists() {
    let cpi = MemoryCpi::new().with_role(
        ACTOR,
        RoleAbility::default().with(AbilityBucket::Ability, "理智", 50),
    );
    // d100 = 70 fails against 50, then 1d6 = 6
    let mut roller = SequenceRoller::new(vec![70, 6]);
    let outcome = run(&cpi, "coc7", ".sc 1/1d6", vec![], &mut roller).await;
    assert_eq!(outcome, DispatchOutcome::Handled(true));
    let record = cpi.role(ACTOR).unwrap();
    assert_eq!(get_role_ability_int(&record, "理智"), Some(44));
    let text = &cpi.messages()[0];
    assert!(text.contains("理智：50→44"));
    assert!(text.contains("临时性疯狂"));
}

#[tokio::test]
async fn sanity_check_without_sanity() {
    let cpi = MemoryCpi::new();
    let mut roller = SequenceRoller::constant(1);
    let outcome = run(&cpi, "coc7", ".sc 1/1d6", vec![], &mut roller).await;
    assert_eq!(outcome, DispatchOutcome::Handled(false));
    assert_eq!(cpi.writes(), 0);
}

#[tokio::test]
async fn setter_batches_one_write() {
    let cpi = MemoryCpi::new().with_role(
        OTHER,
        RoleAbility::default().with(AbilityBucket::Skill, "侦查", 40),
    );
    let mut roller = SequenceRoller::constant(1);
    let outcome = run(
        &cpi,
        "coc7",
        ".st 力量70 侦查+5 san60 @对手",
        vec![other()],
        &mut roller,
    )
    .await;
    assert_eq!(outcome, DispatchOutcome::Handled(true));
    assert_eq!(cpi.writes(), 1);
    let record = cpi.role(OTHER).unwrap();
    assert_eq!(get_role_ability_int(&record, "力量"), Some(70));
    assert_eq!(get_role_ability_int(&record, "侦查"), Some(45));
    assert_eq!(get_role_ability_int(&record, "理智"), Some(60));
    assert!(cpi.role(ACTOR).is_none());
    assert!(cpi.messages()[0].starts_with("对手的属性已更新"));
}

#[tokio::test]
async fn setter_reports_store_failure() {
    let cpi = MemoryCpi::read_only();
    let mut roller = SequenceRoller::constant(1);
    let outcome = run(&cpi, "coc7", ".st 力量70", vec![], &mut roller).await;
    assert_eq!(outcome, DispatchOutcome::Handled(false));
    assert!(cpi.messages()[0].contains("只读模式"));
}

#[tokio::test]
async fn growth_persists_gain() {
    let cpi = MemoryCpi::new().with_role(
        ACTOR,
        RoleAbility::default().with(AbilityBucket::Skill, "侦查", 40),
    );
    let mut roller = SequenceRoller::new(vec![88, 4]);
    run(&cpi, "coc7", ".en 侦查", vec![], &mut roller).await;
    let record = cpi.role(ACTOR).unwrap();
    assert_eq!(get_role_ability_int(&record, "侦查"), Some(44));
}

#[tokio::test]
async fn madness_table() {
    let cpi = MemoryCpi::new();
    let mut roller = SequenceRoller::new(vec![6, 3]);
    let outcome = run(&cpi, "coc7", ".ti", vec![], &mut roller).await;
    assert_eq!(outcome, DispatchOutcome::Handled(true));
    assert!(cpi.messages()[0].contains("昏厥"));
}

#[tokio::test]
async fn cofd_pool_of_eights() {
    let cpi = MemoryCpi::new();
    let mut roller = SequenceRoller::constant(8);
    let outcome = run(&cpi, "CofD", ".ww 10a10k8", vec![], &mut roller).await;
    assert_eq!(outcome, DispatchOutcome::Handled(true));
    assert_eq!(roller.rolls(), 10);
    let text = &cpi.messages()[0];
    assert!(text.contains("第1轮：[8 8 8 8 8 8 8 8 8 8]"));
    assert!(text.ends_with("成功数：10 异常成功"));
}

#[tokio::test]
async fn cofd_rejects_bad_thresholds() {
    let cpi = MemoryCpi::new();
    let mut roller = SequenceRoller::constant(8);
    let outcome = run(&cpi, "CofD", ".ww 10a7k8", vec![], &mut roller).await;
    assert_eq!(outcome, DispatchOutcome::Handled(false));
    assert_eq!(roller.rolls(), 0);
}

#[tokio::test]
async fn cofd_attribute_pool() {
    let cpi = MemoryCpi::new().with_role(
        ACTOR,
        RoleAbility::default()
            .with(AbilityBucket::Ability, "力量", 3)
            .with(AbilityBucket::Ability, "耐力", 2),
    );
    let mut roller = SequenceRoller::constant(9);
    let outcome = run(&cpi, "CofD", ".ra 力量+耐力 a10k8", vec![], &mut roller).await;
    assert_eq!(outcome, DispatchOutcome::Handled(true));
    assert_eq!(roller.rolls(), 5);

    let outcome = run(&cpi, "CofD", ".ra 力量+魅力", vec![], &mut roller).await;
    assert_eq!(outcome, DispatchOutcome::Handled(false));
    assert!(cpi.messages().last().unwrap().contains("未找到属性：魅力"));
}

#[tokio::test]
async fn cofd_initiative_from_dex_and_composure() {
    let cpi = MemoryCpi::new().with_role(
        ACTOR,
        RoleAbility::default()
            .with(AbilityBucket::Ability, "敏捷", 3)
            .with(AbilityBucket::Ability, "沉着", 2),
    );
    let mut roller = SequenceRoller::constant(7);
    run(&cpi, "CofD", ".ri +1", vec![], &mut roller).await;
    assert_eq!(cpi.messages(), vec!["调查员的先攻：1D10=7+5+1=13"]);
}

#[tokio::test]
async fn cofd_initiative_out_of_range_is_reported() {
    let cpi = MemoryCpi::new().with_role(
        ACTOR,
        RoleAbility::default()
            .with(AbilityBucket::Ability, "敏捷", i64::MAX)
            .with(AbilityBucket::Ability, "沉着", 1),
    );
    let mut roller = SequenceRoller::constant(7);
    let outcome = run(&cpi, "CofD", ".ri", vec![], &mut roller).await;
    assert_eq!(outcome, DispatchOutcome::Handled(false));
    assert_eq!(cpi.messages(), vec!["先攻数值超出范围"]);
    assert_eq!(roller.rolls(), 0);
}

#[tokio::test]
async fn cofd_attribute_pool_out_of_range_is_reported() {
    let cpi = MemoryCpi::new().with_role(
        ACTOR,
        RoleAbility::default().with(AbilityBucket::Ability, "力量", i64::MIN),
    );
    let mut roller = SequenceRoller::constant(9);
    let outcome = run(&cpi, "CofD", ".ra 1-力量", vec![], &mut roller).await;
    assert_eq!(outcome, DispatchOutcome::Handled(false));
    assert!(cpi.messages()[0].contains("属性之和超出范围"));
    assert_eq!(roller.rolls(), 0);
}

#[tokio::test]
async fn setter_reports_extreme_change() {
    let cpi = MemoryCpi::new();
    let mut roller = SequenceRoller::constant(1);
    let first = run(&cpi, "coc7", ".st 力量-1", vec![], &mut roller).await;
    assert_eq!(first, DispatchOutcome::Handled(true));
    let second = run(&cpi, "coc7", ".st 力量9223372036854775807", vec![], &mut roller).await;
    assert_eq!(second, DispatchOutcome::Handled(true));
    assert!(cpi.messages()[1].contains("力量：-1→9223372036854775807（+9223372036854775808）"));
    let record = cpi.role(ACTOR).unwrap();
    assert_eq!(get_role_ability_int(&record, "力量"), Some(i64::MAX));
}

#[tokio::test]
async fn offline_store_is_reported_before_rolling() {
    let cpi = MemoryCpi::offline();
    let mut roller = SequenceRoller::constant(1);
    let outcome = run(&cpi, "coc7", ".sc 1/1d6", vec![], &mut roller).await;
    assert_eq!(outcome, DispatchOutcome::Handled(false));
    assert_eq!(cpi.messages(), vec!["角色数据暂时不可用：存储离线"]);
    assert_eq!(roller.rolls(), 0);
}

#[tokio::test]
async fn pokemon_attack_updates_hp() {
    let cpi = MemoryCpi::new()
        .with_role(
            ACTOR,
            RoleAbility::default()
                .with(AbilityBucket::Ability, "特攻", 50)
                .with(AbilityBucket::Basic, "属性", "电"),
        )
        .with_role(
            OTHER,
            RoleAbility::default()
                .with(AbilityBucket::Ability, "特防", 30)
                .with(AbilityBucket::Ability, "生命值", 100)
                .with(AbilityBucket::Basic, "属性", "水"),
        );
    let mut roller = SequenceRoller::constant(1);
    let outcome = run(
        &cpi,
        "宝可梦trpg",
        ".atk 十万伏特 @对手",
        vec![other()],
        &mut roller,
    )
    .await;
    assert_eq!(outcome, DispatchOutcome::Handled(true));
    let record = cpi.role(OTHER).unwrap();
    assert_eq!(get_role_ability_int(&record, "生命值"), Some(55));
    assert_eq!(get_role_ability_value(&record, "属性").as_deref(), Some("水"));
    assert!(cpi.messages()[0].contains("效果拔群"));
}

#[tokio::test]
async fn pokemon_status_skill_deals_no_damage() {
    let cpi = MemoryCpi::new();
    let mut roller = SequenceRoller::constant(1);
    let outcome = run(&cpi, "pokemon", ".atk 电磁波", vec![other()], &mut roller).await;
    assert_eq!(outcome, DispatchOutcome::Handled(true));
    assert_eq!(cpi.writes(), 0);
}

#[tokio::test]
async fn pokemon_attack_needs_target() {
    let cpi = MemoryCpi::new();
    let mut roller = SequenceRoller::constant(1);
    let outcome = run(&cpi, "宝可梦trpg", ".atk 电击", vec![], &mut roller).await;
    assert_eq!(outcome, DispatchOutcome::Handled(false));
}

#[tokio::test]
async fn common_roll_falls_back_from_ruleset() {
    let cpi = MemoryCpi::new();
    let mut roller = SequenceRoller::new(vec![2, 5, 1]);
    let outcome = run(&cpi, "coc7", ".r 3d6+2 潜行", vec![], &mut roller).await;
    assert_eq!(outcome, DispatchOutcome::Handled(true));
    assert_eq!(
        cpi.messages(),
        vec!["调查员因「潜行」掷骰：3d6+2=[2+5+1]+2=10"]
    );
}

#[tokio::test]
async fn common_roll_reports_bad_expression() {
    let cpi = MemoryCpi::new();
    let mut roller = SequenceRoller::constant(1);
    let outcome = run(&cpi, "通用", ".r 1/0", vec![], &mut roller).await;
    assert_eq!(outcome, DispatchOutcome::Handled(false));
    assert!(cpi.messages()[0].starts_with("表达式错误"));
}

#[tokio::test]
async fn help_lists_namespace() {
    let cpi = MemoryCpi::new();
    let mut roller = SequenceRoller::constant(1);
    run(&cpi, "CofD", ".help", vec![], &mut roller).await;
    let text = &cpi.messages()[0];
    assert!(text.contains(".ww"));
    assert!(text.contains(".r："));
}

#[tokio::test]
async fn unknown_ruleset_and_command() {
    let cpi = MemoryCpi::new();
    let mut roller = SequenceRoller::constant(1);
    assert_eq!(
        run(&cpi, "dnd5e", ".r", vec![], &mut roller).await,
        DispatchOutcome::UnknownRuleset("dnd5e".into())
    );
    assert_eq!(
        run(&cpi, "coc7", ".xyz", vec![], &mut roller).await,
        DispatchOutcome::UnknownCommand("xyz".into())
    );
    assert!(cpi.outbox().is_empty());
}

#[tokio::test]
async fn strict_dispatch_does_not_fall_back() {
    let cpi = MemoryCpi::new();
    let mut roller = SequenceRoller::constant(1);
    let input = CommandInput::parse(".r d6").unwrap();
    let outcome = registry()
        .dispatch("coc7", input, &cpi, &actor(), &mut roller)
        .await;
    assert_eq!(outcome, DispatchOutcome::UnknownCommand("r".into()));
}

#[test]
fn help_text_for_command() {
    let text = registry().help_text("coc7", Some("ra")).unwrap();
    assert!(text.starts_with(".rc："));
    assert!(registry().help_text("coc7", Some("nothing")).is_none());
    assert!(registry().help_text("none", None).is_none());
}
