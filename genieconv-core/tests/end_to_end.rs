use genieconv_core::testing::{materialize_all, LineBuilder, RegistryBuilder};
use genieconv_core::{
    convert_group_effects, ConversionReport, ConvertConfig, ForwardRef, GroupId,
    IdentityRegistry, MemberOperator, MemberValue, ResolutionError, ResolutionPass,
};
use geniedata::{AbilityId, EffectRecord, GameEntityLine};

const TECH: GroupId = GroupId::tech(22);

fn swordsman_line() -> GameEntityLine {
    LineBuilder::new(74)
        .variant(74, "Militia", &[AbilityId::Live, AbilityId::Move])
        .variant(
            75,
            "ManAtArms",
            &[AbilityId::Live, AbilityId::Move, AbilityId::Regenerate],
        )
        .variant(
            77,
            "LongSwordsman",
            &[AbilityId::Live, AbilityId::Move, AbilityId::Regenerate],
        )
        .build()
}

#[test]
fn test_regeneration_tech_resolves_to_variant_members() {
    let mut pass = ResolutionPass::new(RegistryBuilder::new().tech(22, "Supremacy").build());
    let mut report = ConversionReport::new();
    let records: Vec<EffectRecord> = serde_json::from_str(
        r#"[{"command_type": 4, "unit_id": 74, "class_id": -1, "attribute_id": 109, "amount": 0.5}]"#,
    )
    .unwrap();

    let refs = convert_group_effects(
        pass.registry_mut().unwrap(),
        TECH,
        &records,
        &[swordsman_line()],
        &ConvertConfig::default(),
        &mut report,
    )
    .unwrap();
    assert_eq!(refs.len(), 2);
    assert_eq!(pass.registry().patch_count(), 2);

    // Materialize the two regeneration members the way the object model builder would
    let mut identities = IdentityRegistry::new();
    let man_at_arms = identities.materialize(TECH, "ManAtArms.Regenerate.rate");
    let long_swordsman = identities.materialize(TECH, "LongSwordsman.Regenerate.rate");
    pass.close();

    let resolved = pass.resolve(&identities).unwrap();
    assert_eq!(resolved.len(), 1);
    let patches = &resolved[0].patches;
    assert_eq!(patches.len(), 2);
    assert_eq!(patches[0].target.object, man_at_arms);
    assert_eq!(patches[1].target.object, long_swordsman);
    for patch in patches {
        assert_eq!(patch.member_name, "rate");
        assert_eq!(patch.operator, MemberOperator::Add);
        assert_eq!(patch.value, MemberValue::Float(0.5));
        assert!(!patch.team_wide);
    }
    assert!(report.is_clean());
}

#[test]
fn test_team_bonus_across_allies_resolves() {
    let registry = RegistryBuilder::new()
        .tech(22, "Supremacy")
        .civ(1, "Britons")
        .civ(2, "Franks")
        .ally(TECH, GroupId::civ(1))
        .ally(TECH, GroupId::civ(2))
        .build();
    let mut pass = ResolutionPass::new(registry);
    let mut report = ConversionReport::new();
    let team_add = EffectRecord {
        command_type: 14,
        unit_id: 77,
        class_id: -1,
        attribute_id: 109,
        amount: 1.0,
    };

    let refs = convert_group_effects(
        pass.registry_mut().unwrap(),
        TECH,
        &[team_add],
        &[swordsman_line()],
        &ConvertConfig::default(),
        &mut report,
    )
    .unwrap();

    // 2 qualifying variants x (tech + 2 allies)
    assert_eq!(refs.len(), 6);
    assert_eq!(
        refs[..3],
        [
            ForwardRef::new(TECH, "ManAtArms.Regenerate.rate"),
            ForwardRef::new(GroupId::civ(1), "ManAtArms.Regenerate.rate"),
            ForwardRef::new(GroupId::civ(2), "ManAtArms.Regenerate.rate"),
        ]
    );

    let identities = materialize_all(pass.registry());
    pass.close();
    let resolved = pass.resolve(&identities).unwrap();
    assert_eq!(resolved.len(), 3);
    assert!(resolved
        .iter()
        .all(|g| g.patches.len() == 2 && g.patches.iter().all(|p| p.team_wide)));
}

#[test]
fn test_missing_object_fails_whole_run() {
    let mut pass = ResolutionPass::new(RegistryBuilder::new().tech(22, "Supremacy").build());
    {
        let mut ctx = pass.context(TECH).unwrap();
        let subprocessor = genieconv_core::EffectId::RegenerationRate.subprocessor();
        subprocessor(
            &mut ctx,
            &swordsman_line(),
            MemberValue::Float(0.5),
            MemberOperator::Add,
            false,
        )
        .unwrap();
    }

    let mut identities = IdentityRegistry::new();
    identities.materialize(TECH, "ManAtArms.Regenerate.rate");
    pass.close();

    match pass.resolve(&identities) {
        Err(ResolutionError::Unresolved { refs }) => {
            assert_eq!(refs.len(), 1);
            assert_eq!(refs[0].group, TECH);
            assert_eq!(refs[0].object_path, "LongSwordsman.Regenerate.rate");
        }
        other => panic!("expected unresolved reference, got {:?}", other),
    }
    assert!(pass.context(TECH).is_err());
}
