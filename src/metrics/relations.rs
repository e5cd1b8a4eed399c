use crate::linking::{AttributeLink, ReferenceModel, RelationEdge, TypeId, TypeLink};
use crate::types::RelationKind;

/// Derives counted relation edges for a type from the linked model.
///
/// Every type link reachable from the type's own declarations is counted,
/// generic arguments included. Self references and generic parameters are
/// skipped. Edges appear in order of first occurrence.
pub fn derive_relations(model: &ReferenceModel, type_id: TypeId) -> Vec<RelationEdge> {
    let mut collector = RelationCollector {
        owner: type_id,
        edges: Vec::new(),
    };
    let node = model.type_node(type_id);

    for base in &node.base_types {
        collector.add_link(RelationKind::Inheritance, base);
    }
    collector.add_attributes(&node.attributes);

    for &f in &node.fields {
        let field = model.field(f);
        collector.add_link(RelationKind::Declarations, &field.type_link);
        collector.add_attributes(&field.attributes);
    }
    for &p in &node.properties {
        let property = model.property(p);
        collector.add_link(RelationKind::Declarations, &property.type_link);
        collector.add_attributes(&property.attributes);
    }

    let methods = model
        .methods()
        .iter()
        .filter(|m| !m.is_synthetic && m.containing_type == type_id);
    for method in methods {
        collector.add_attributes(&method.attributes);
        for &p in &method.parameters {
            let parameter = model.parameter(p);
            collector.add_link(RelationKind::Parameters, &parameter.type_link);
            collector.add_attributes(&parameter.attributes);
        }
        if let Some(return_type) = &method.return_type {
            collector.add_link(RelationKind::ReturnValues, return_type);
        }
        for &l in &method.local_variables {
            collector.add_link(RelationKind::LocalVariables, &model.local_variable(l).type_link);
        }
        for call in &method.calls {
            if let Some(target) = call.target {
                collector.add(RelationKind::Calls, model.method(target).containing_type);
            }
        }
    }

    collector.edges
}

struct RelationCollector {
    owner: TypeId,
    edges: Vec<RelationEdge>,
}

impl RelationCollector {
    fn add(&mut self, relation: RelationKind, target: TypeId) {
        if target == self.owner {
            return;
        }
        match self
            .edges
            .iter_mut()
            .find(|e| e.relation == relation && e.target == target)
        {
            Some(edge) => edge.count += 1,
            None => self.edges.push(RelationEdge {
                relation,
                target,
                count: 1,
            }),
        }
    }

    fn add_link(&mut self, relation: RelationKind, link: &TypeLink) {
        if let Some(target) = link.target {
            self.add(relation, target);
        }
        for arg in &link.generic_arguments {
            self.add_link(relation, arg);
        }
    }

    fn add_attributes(&mut self, attributes: &[AttributeLink]) {
        for attribute in attributes {
            self.add_link(RelationKind::Attributes, &attribute.type_link);
        }
    }
}
