//! Per-type snapshots
//!
//! A snapshot carries the persisted fields of a type and its members. It
//! never carries the cache handle, the registry or token lists; restoring
//! re-links the type into the registry and its namespace.

use crate::{
    qualify, Artifact, ArtifactData, ArtifactId, ArtifactKind, CodeModel, ModelError, Modifiers,
    TypeData, UnitId,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Persisted state of a method or property
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberSnapshot {
    pub id: ArtifactId,
    pub kind: ArtifactKind,
    pub name: String,
    pub doc_comment: Option<String>,
    pub modifiers: Option<Modifiers>,
    pub unit: Option<UnitId>,
    pub lines: (u32, u32),
    pub data: ArtifactData,
}

/// Persisted state of a class, interface or trait
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeSnapshot {
    pub id: ArtifactId,
    pub kind: ArtifactKind,
    pub name: String,
    pub doc_comment: Option<String>,
    pub modifiers: Option<Modifiers>,
    pub unit: Option<UnitId>,
    pub lines: (u32, u32),
    pub data: TypeData,
    pub members: Vec<MemberSnapshot>,
}

fn member_snapshot(artifact: &Artifact) -> MemberSnapshot {
    MemberSnapshot {
        id: artifact.id(),
        kind: artifact.kind(),
        name: artifact.name.clone(),
        doc_comment: artifact.doc_comment.clone(),
        modifiers: artifact.raw_modifiers(),
        unit: artifact.unit(),
        lines: (artifact.start_line(), artifact.end_line()),
        data: artifact.data.clone(),
    }
}

impl CodeModel {
    /// Capture a type and its members
    pub fn snapshot_type(&self, id: ArtifactId) -> Result<TypeSnapshot, ModelError> {
        let artifact = self.artifact(id)?;
        let data = self.type_data(id)?;
        let members = data
            .members
            .iter()
            .map(|&member| self.artifact(member).map(member_snapshot))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(TypeSnapshot {
            id,
            kind: artifact.kind(),
            name: artifact.name.clone(),
            doc_comment: artifact.doc_comment.clone(),
            modifiers: artifact.raw_modifiers(),
            unit: artifact.unit(),
            lines: (artifact.start_line(), artifact.end_line()),
            data: data.clone(),
            members,
        })
    }

    /// Restore a type from a snapshot into its original slot
    ///
    /// The owning namespace must already exist in the registry. Members get
    /// the type as parent again and inherit its compilation unit when they
    /// have none.
    pub fn restore_type(&mut self, snapshot: TypeSnapshot) -> Result<ArtifactId, ModelError> {
        let TypeSnapshot {
            id,
            kind,
            name,
            doc_comment,
            modifiers,
            unit,
            lines,
            mut data,
            members,
        } = snapshot;

        if !kind.is_type() {
            return Err(ModelError::WrongKind {
                id,
                expected: "type",
            });
        }
        let namespace = self.lookup_namespace(&data.namespace_name).ok_or_else(|| {
            ModelError::MissingContext(format!(
                "namespace `{}` of `{}` is not registered",
                data.namespace_name, name
            ))
        })?;
        self.artifact(id)?;
        for member in &members {
            self.artifact(member.id)?;
        }

        data.namespace = Some(namespace);
        data.members = members.iter().map(|m| m.id).collect();
        let qualified = qualify(&data.namespace_name, &name);

        let mut restored =
            Artifact::restored(id, kind, name, modifiers, unit, lines, ArtifactData::Type(data));
        restored.doc_comment = doc_comment;
        self.replace(restored)?;

        for member in members {
            let mut member_data = member.data;
            match &mut member_data {
                ArtifactData::Routine(routine) => routine.parent = Some(id),
                ArtifactData::Property(property) => property.parent = Some(id),
                _ => {
                    return Err(ModelError::WrongKind {
                        id: member.id,
                        expected: "member",
                    })
                }
            }
            let mut artifact = Artifact::restored(
                member.id,
                member.kind,
                member.name,
                member.modifiers,
                member.unit.or(unit),
                member.lines,
                member_data,
            );
            artifact.doc_comment = member.doc_comment;
            self.replace(artifact)?;
        }

        self.registry_mut().register_type(&qualified, id);
        self.register_in_namespace(namespace, id)?;
        debug!(%id, name = %qualified, "restored type");
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Constant, ConstantValue, TypeRef};

    fn sample() -> (CodeModel, ArtifactId, ArtifactId) {
        let mut model = CodeModel::new();
        let ns = model.add_namespace("app");
        model.add_class(ns, "Base").unwrap();
        let user = model.add_class(ns, "User").unwrap();
        let unit = model.add_compilation_unit(Some("User.php"));
        model.set_compilation_unit(user, unit).unwrap();
        model.set_modifiers(user, Modifiers::FINAL).unwrap();
        {
            let data = model.type_data_mut(user).unwrap();
            data.parent = Some(TypeRef::new("app\\Base"));
            data.constants.push(Constant::new("LIMIT", ConstantValue::Int(10)));
            data.user_defined = true;
        }
        model.artifact_mut(user).unwrap().doc_comment = Some("/** A user */".into());
        let save = model.add_method(user, "save").unwrap();
        (model, user, save)
    }

    #[test]
    fn test_round_trip_preserves_identity_and_links() {
        let (mut model, user, save) = sample();
        let json = serde_json::to_string(&model.snapshot_type(user).unwrap()).unwrap();

        // Break the back link so the restore has something to re-establish
        model.routine_mut(save).unwrap().parent = None;

        let snapshot: TypeSnapshot = serde_json::from_str(&json).unwrap();
        let restored = model.restore_type(snapshot).unwrap();

        assert_eq!(restored, user);
        assert_eq!(model.get(save).unwrap().parent(), Some(user));
        assert_eq!(model.namespace_of(user), model.lookup_namespace("app"));
        assert_eq!(
            model.resolve(model.type_data(user).unwrap().parent.as_ref().unwrap()),
            model.lookup_type("app\\Base")
        );
        assert_eq!(model.lookup_type("app\\User"), Some(user));
        assert!(model.get(user).unwrap().is_final());
        assert!(!model.get(user).unwrap().is_cached());
        assert_eq!(model.get(user).unwrap().doc_comment.as_deref(), Some("/** A user */"));

        let ns = model.lookup_namespace("app").unwrap();
        let registered = model.namespace_data(ns).unwrap().types.iter().filter(|&&t| t == user).count();
        assert_eq!(registered, 1);
    }

    #[test]
    fn test_restore_propagates_unit_to_members() {
        let (mut model, user, save) = sample();
        let mut snapshot = model.snapshot_type(user).unwrap();
        let unit = model.get(user).unwrap().unit();
        assert!(unit.is_some());
        snapshot.members[0].unit = None;

        model.restore_type(snapshot).unwrap();
        assert_eq!(model.get(save).unwrap().unit(), unit);
    }

    #[test]
    fn test_restore_without_namespace_context_fails() {
        let (model, user, _) = sample();
        let snapshot = model.snapshot_type(user).unwrap();

        let mut empty = CodeModel::new();
        let err = empty.restore_type(snapshot).unwrap_err();
        assert!(matches!(err, ModelError::MissingContext(_)));
    }
}
